use super::*;
use obs_core::{CaptureStatus, SolveStatus};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn collection_url_strips_trailing_slash_on_base() {
    let catalog = PocketbaseCatalog::new("http://localhost:8090/");
    assert_eq!(
        catalog.collection_url(""),
        "http://localhost:8090/api/collections/jobs/records"
    );
    assert_eq!(
        catalog.collection_url("/abc123"),
        "http://localhost:8090/api/collections/jobs/records/abc123"
    );
}

#[test]
fn status_names_match_catalog_schema() {
    assert_eq!(status_name(CaptureStatus::Queued), "QUEUED");
    assert_eq!(status_name(CaptureStatus::Running), "RUNNING");
    assert_eq!(status_name(CaptureStatus::Failed), "FAILED");
    assert_eq!(status_name(CaptureStatus::Finished), "FINISHED");
    assert_eq!(status_name(CaptureStatus::Expired), "EXPIRED");
}

#[test]
fn solve_names_match_catalog_schema() {
    assert_eq!(solve_name(SolveStatus::Unsolved), "UNSOLVED");
    assert_eq!(solve_name(SolveStatus::Solved), "SOLVED");
    assert_eq!(solve_name(SolveStatus::SolveFailed), "SOLVE_FAILED");
    assert_eq!(solve_name(SolveStatus::DontSolve), "DONT_SOLVE");
}

#[test]
fn job_patch_builder_sets_only_touched_fields() {
    let patch = JobPatch::new().capture_status(CaptureStatus::Running).jd_obs(2_460_000.5);
    assert_eq!(patch.capture_status, Some(CaptureStatus::Running));
    assert_eq!(patch.jd_obs, Some(2_460_000.5));
    assert!(patch.solve.is_none());
    assert!(patch.frame.is_none());
    assert!(patch.log.is_none());
}

#[test]
fn job_patch_clear_frame_is_distinct_from_untouched() {
    let untouched = JobPatch::new();
    let cleared = JobPatch::new().clear_frame();
    assert!(untouched.frame.is_none());
    assert_eq!(cleared.frame, Some(None));
}

/// A minimal well-formed single-block FITS buffer, for exercising
/// [`PocketbaseCatalog::fetch_frame`]'s gzip round trip without pulling in
/// `fits.rs`'s private test helpers.
fn tiny_fits_bytes() -> Vec<u8> {
    fn card(keyword: &str, value: &str) -> String {
        format!("{:<80}", format!("{keyword:<8}= {value}"))
    }
    let mut header = String::new();
    header.push_str(&card("SIMPLE", "T"));
    header.push_str(&card("BITPIX", "16"));
    header.push_str(&card("NAXIS", "2"));
    header.push_str(&card("NAXIS1", "2"));
    header.push_str(&card("NAXIS2", "2"));
    header.push_str(&card("DATE-OBS", "'2026-03-14T05:30:00'"));
    header.push_str(&card("CRVAL1", "180.0"));
    header.push_str(&card("CRVAL2", "10.0"));
    header.push_str(&card("CRPIX1", "1.5"));
    header.push_str(&card("CRPIX2", "1.5"));
    header.push_str(&card("CD1_1", "-0.0002777778"));
    header.push_str(&card("CD1_2", "0.0"));
    header.push_str(&card("CD2_1", "0.0"));
    header.push_str(&card("CD2_2", "0.0002777778"));
    header.push_str(&format!("{:<80}", "END"));

    let mut bytes = header.into_bytes();
    while bytes.len() % 2880 != 0 {
        bytes.push(b' ');
    }
    bytes.extend(std::iter::repeat(0u8).take(2 * 2 * 2));
    bytes
}

#[tokio::test]
async fn authenticate_sends_bearer_token_on_subsequent_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/collections/users/auth-with-password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": "s3cr3t" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/collections/jobs/records"))
        .and(header("authorization", "Bearer s3cr3t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": [] })))
        .mount(&server)
        .await;

    let catalog = PocketbaseCatalog::authenticate(server.uri(), "observer", "hunter2").await.unwrap();
    let jobs = catalog.get_jobs(CaptureStatus::Queued).await.unwrap();
    assert!(jobs.is_empty());
}

#[tokio::test]
async fn authenticate_surfaces_bad_credentials_as_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/collections/users/auth-with-password"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let err = PocketbaseCatalog::authenticate(server.uri(), "observer", "wrong").await.unwrap_err();
    assert!(matches!(err, CatalogError::Request(_)));
}

#[tokio::test]
async fn fetch_frame_decompresses_the_gzip_payload_into_a_parsed_frame() {
    let server = MockServer::start().await;
    let raw = tiny_fits_bytes();

    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    std::io::Write::write_all(&mut encoder, &raw).unwrap();
    let compressed = encoder.finish().unwrap();

    Mock::given(method("GET"))
        .and(path("/frames/frame.fits.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(compressed))
        .mount(&server)
        .await;

    let catalog = PocketbaseCatalog::new(server.uri());
    let frame = catalog.fetch_frame(&format!("{}/frames/frame.fits.gz", server.uri())).await.unwrap();
    assert_eq!(frame.header.naxis1, 2);
    assert_eq!(frame.header.naxis2, 2);
    assert_eq!(frame.bytes(), raw.as_slice());
}
