//! API tests

mod application_tests;
mod gateway_tests;
mod health_tests;
mod interview_tests;
mod message_tests;
