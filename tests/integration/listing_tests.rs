use crate::fake_driver::{
    listing_page, Consent, FakeDriver, NextControl, CONSENT_SELECTOR, NEXT_SELECTOR,
};
use bourse_harvest::config::{ConsentConfig, ExtractorConfig};
use bourse_harvest::crawler::{
    CrawlSession, PaginationController, PaginationSettings, RecordExtractor,
};
use bourse_harvest::driver::{Locator, SelectorKind};
use bourse_harvest::output::CsvSink;
use bourse_harvest::state::{EndCause, Termination};
use bourse_harvest::HarvestError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::time::Duration;

const LISTING_URL: &str = "https://www.nse.co.ke/corporate-actions/";

fn controller() -> PaginationController {
    let settings = PaginationSettings {
        next_control: Locator::css(NEXT_SELECTOR),
        disabled_marker: "inactive".to_string(),
        settle_delay: Duration::from_secs(2),
        max_pages: None,
    };
    let extractor =
        RecordExtractor::new(&ExtractorConfig::default()).expect("Failed to build extractor");
    PaginationController::new(settings, extractor)
}

fn consent_config() -> Option<ConsentConfig> {
    Some(ConsentConfig {
        selector_kind: SelectorKind::Id,
        selector: CONSENT_SELECTOR.to_string(),
        dismiss_delay_ms: 2000,
    })
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_pages_are_deduplicated() {
    let driver = FakeDriver::new(vec![
        (
            listing_page(&[("Acme Corp", "2.50", "01-Jan-2024")]),
            NextControl::Enabled,
        ),
        (
            listing_page(&[
                ("Acme Corp", "2.50", "01-Jan-2024"),
                ("Beta Ltd", "1.00", "02-Jan-2024"),
            ]),
            NextControl::Disabled,
        ),
    ]);
    let log = driver.log();

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("dividends.csv");
    let mut sink = CsvSink::new(&output);

    let report = CrawlSession::new(driver)
        .run_listing(LISTING_URL, controller(), &mut sink)
        .await
        .expect("Listing failed");

    assert_eq!(report.dataset.len(), 2);
    assert_eq!(report.outcome.pages_fetched, 2);
    assert_eq!(report.outcome.records_extracted, 3);
    assert_eq!(
        report.outcome.termination,
        Termination::NormalEnd(EndCause::ControlDisabled)
    );

    let acme = &report.dataset.records()[0];
    assert_eq!(acme.subject, "Acme Corp");
    assert_eq!(acme.amount, Some(Decimal::new(250, 2)));
    assert_eq!(acme.announce_date, NaiveDate::from_ymd_opt(2024, 1, 1));
    let beta = &report.dataset.records()[1];
    assert_eq!(beta.subject, "Beta Ltd");
    assert_eq!(beta.amount, Some(Decimal::new(100, 2)));

    let csv = std::fs::read_to_string(&output).expect("CSV not written");
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "Company,Dividend,Announce Date,Book Closure Date,Payment Date"
    );
    assert_eq!(lines[1], "Acme Corp,2.50,01-Jan-2024,05-Feb-2024,01-Mar-2024");
    assert_eq!(lines[2], "Beta Ltd,1.00,02-Jan-2024,05-Feb-2024,01-Mar-2024");

    let log = log.lock().unwrap();
    assert_eq!(log.navigations, vec![LISTING_URL.to_string()]);
    assert_eq!(log.releases, 1);
}

#[tokio::test(start_paused = true)]
async fn test_absent_next_control_stops_after_first_page() {
    let driver = FakeDriver::new(vec![
        (
            listing_page(&[
                ("Acme Corp", "2.50", "01-Jan-2024"),
                ("Gamma Plc", "0.30", "03-Jan-2024"),
            ]),
            NextControl::Absent,
        ),
        (
            listing_page(&[("Never Seen", "9.99", "09-Jan-2024")]),
            NextControl::Absent,
        ),
    ]);
    let log = driver.log();

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut sink = CsvSink::new(dir.path().join("dividends.csv"));

    let report = CrawlSession::new(driver)
        .run_listing(LISTING_URL, controller(), &mut sink)
        .await
        .expect("Listing failed");

    let subjects: Vec<_> = report
        .dataset
        .iter()
        .map(|r| r.subject.as_str())
        .collect();
    assert_eq!(subjects, vec!["Acme Corp", "Gamma Plc"]);
    assert_eq!(
        report.outcome.termination,
        Termination::NormalEnd(EndCause::ControlAbsent)
    );

    let log = log.lock().unwrap();
    assert_eq!(log.fetches, 1);
    assert!(log.clicks.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_click_failure_returns_partial_dataset() {
    let driver = FakeDriver::new(vec![
        (
            listing_page(&[("Acme Corp", "2.50", "01-Jan-2024")]),
            NextControl::Enabled,
        ),
        (
            listing_page(&[("Beta Ltd", "1.00", "02-Jan-2024")]),
            NextControl::ClickFails,
        ),
        (
            listing_page(&[("Gamma Plc", "0.30", "03-Jan-2024")]),
            NextControl::Disabled,
        ),
    ]);
    let log = driver.log();

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("dividends.csv");
    let mut sink = CsvSink::new(&output);

    let report = CrawlSession::new(driver)
        .run_listing(LISTING_URL, controller(), &mut sink)
        .await
        .expect("Masked interaction errors should not fail the harvest");

    assert_eq!(report.dataset.len(), 2);
    assert!(matches!(
        report.outcome.termination,
        Termination::EndedOnInteractionError(_)
    ));
    assert!(output.exists());
    assert_eq!(log.lock().unwrap().releases, 1);
}

#[tokio::test(start_paused = true)]
async fn test_consent_is_dismissed_before_paging() {
    let driver = FakeDriver::new(vec![(
        listing_page(&[("Acme Corp", "2.50", "01-Jan-2024")]),
        NextControl::Absent,
    )])
    .with_consent(Consent::Present);
    let log = driver.log();

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut sink = CsvSink::new(dir.path().join("dividends.csv"));

    CrawlSession::new(driver)
        .with_consent(consent_config())
        .run_listing(LISTING_URL, controller(), &mut sink)
        .await
        .expect("Listing failed");

    assert_eq!(log.lock().unwrap().clicks, vec!["consent".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_consent_failures_are_ignored() {
    for consent in [Consent::Missing, Consent::ClickFails] {
        let driver = FakeDriver::new(vec![(
            listing_page(&[("Acme Corp", "2.50", "01-Jan-2024")]),
            NextControl::Absent,
        )])
        .with_consent(consent);

        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut sink = CsvSink::new(dir.path().join("dividends.csv"));

        let report = CrawlSession::new(driver)
            .with_consent(consent_config())
            .run_listing(LISTING_URL, controller(), &mut sink)
            .await
            .expect("Consent trouble must not fail the harvest");

        assert_eq!(report.dataset.len(), 1, "consent behaviour {:?}", consent);
    }
}

#[tokio::test(start_paused = true)]
async fn test_driver_released_when_navigation_fails() {
    let driver = FakeDriver::new(vec![]).with_failing_navigation();
    let log = driver.log();

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("dividends.csv");
    let mut sink = CsvSink::new(&output);

    let result = CrawlSession::new(driver)
        .run_listing(LISTING_URL, controller(), &mut sink)
        .await;

    assert!(matches!(result, Err(HarvestError::Driver(_))));
    assert!(!output.exists());
    assert_eq!(log.lock().unwrap().releases, 1);
}
