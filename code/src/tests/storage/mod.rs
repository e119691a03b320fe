mod b_plus_tree;
