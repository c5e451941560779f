mod nesting_tests;
mod slice_tests;
