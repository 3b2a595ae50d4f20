//! Integration tests for the harvester
//!
//! Listing and download flows run against a scripted in-process driver;
//! the WebDriver adapter is tested against a wiremock server.

mod listing_tests;
mod webdriver_tests;
