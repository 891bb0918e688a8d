//! Integration tests simulating full match flows through the public
//! driver contract, plus white-box cascade tests that drive the action
//! queue directly.

mod match_tests;
