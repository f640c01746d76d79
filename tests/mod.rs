mod support;

mod config_tests;
mod dispatcher_tests;
mod karma_tests;
