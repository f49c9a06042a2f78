mod models;

mod gibbs_tests;
mod persistent_vec_tests;
mod two_node_test;
