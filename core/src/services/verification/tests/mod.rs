//! Tests for the verification engine


mod session_tests;
