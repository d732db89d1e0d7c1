//! End-to-end audit tests
//!
//! These tests stand up wiremock sites and run full audits against them,
//! asserting on the issue list and the crawl artifacts.

use linkledger::classify::{AnchorCandidate, Classifier, ClassifyFuture, Verdict};
use linkledger::config::{
    ClassifierConfig, Config, CrawlerConfig, OutputConfig, PageBudget, SiteConfig, UserAgentConfig,
};
use linkledger::crawler::{run_audit, run_audit_with_classifier, AuditOutcome};
use linkledger::rules::Issue;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(seed: &str) -> Config {
    Config {
        site: SiteConfig {
            url: seed.to_string(),
        },
        crawler: CrawlerConfig {
            page_budget: PageBudget::Unlimited,
            max_redirect_hops: 5,
            request_timeout_secs: 5,
            sitemap_depth: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            database_path: "./unused.db".to_string(),
            report_path: "./unused.md".to_string(),
            json_path: None,
        },
        classifier: ClassifierConfig::default(),
    }
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

fn kinds_of(outcome: &AuditOutcome, kind: &str) -> Vec<Issue> {
    outcome
        .issues
        .iter()
        .filter(|i| i.kind() == kind)
        .cloned()
        .collect()
}

async fn mount_page(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(html(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_broken_link_scenario() {
    // Seed returns 200 with links to /a (404) and /b (200, links back to
    // the seed).
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        format!(
            "<html><head><title>Home</title></head><body><h1>Home</h1>\
             <a href=\"{base}/a\">A</a><a href=\"{base}/b\">B</a></body></html>"
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_raw("<html><body>gone</body></html>".to_string(), "text/html"),
        )
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/b",
        format!(
            "<html><head><title>B</title></head><body><h1>B</h1>\
             <a href=\"{base}/\">Home</a></body></html>"
        ),
    )
    .await;

    let outcome = run_audit(&test_config(&format!("{base}/"))).await.unwrap();

    let broken = kinds_of(&outcome, "broken_page");
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].primary_url(), format!("{base}/a"));

    let broken_links = kinds_of(&outcome, "broken_internal_link");
    assert_eq!(broken_links.len(), 1);
    match &broken_links[0] {
        Issue::BrokenInternalLink {
            source_url,
            target_url,
            target_status,
        } => {
            assert_eq!(source_url, &format!("{base}/"));
            assert_eq!(target_url, &format!("{base}/a"));
            assert_eq!(*target_status, 404);
        }
        other => panic!("wrong issue: {:?}", other),
    }

    // Incoming counts: /b has one (from the seed), the seed has one (from /b).
    assert_eq!(
        outcome
            .store
            .get(&format!("{base}/b"))
            .unwrap()
            .incoming_internal_link_count,
        1
    );
    assert_eq!(
        outcome
            .store
            .get(&format!("{base}/"))
            .unwrap()
            .incoming_internal_link_count,
        1
    );
}

#[tokio::test]
async fn test_sitemap_orphan_scenario() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<urlset><url><loc>{base}/</loc></url><url><loc>{base}/orphan</loc></url></urlset>"
        )))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/",
        "<html><head><title>Home</title></head><body><h1>Home</h1></body></html>".to_string(),
    )
    .await;

    let outcome = run_audit(&test_config(&format!("{base}/"))).await.unwrap();

    let orphans = kinds_of(&outcome, "sitemap_orphan");
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].primary_url(), format!("{base}/orphan"));
}

#[tokio::test]
async fn test_redirect_loop_scenario() {
    // Seed links to /a; /a and /b redirect to each other. The redirect
    // ceiling bounds the attempt, and the completed chain shows the loop.
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        format!(
            "<html><head><title>Home</title></head><body><h1>Home</h1>\
             <a href=\"{base}/a\">A</a></body></html>"
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/b"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/a"))
        .mount(&server)
        .await;

    let outcome = run_audit(&test_config(&format!("{base}/"))).await.unwrap();

    let loops = kinds_of(&outcome, "redirect_loop");
    assert_eq!(loops.len(), 1);
    assert_eq!(loops[0].primary_url(), format!("{base}/a"));

    let record = outcome.store.get(&format!("{base}/a")).unwrap();
    assert_eq!(
        record.fetch_error,
        Some(linkledger::record::FetchError::MaxRedirectsExceeded)
    );
}

#[tokio::test]
async fn test_redirect_chain_fidelity_scenario() {
    // /a -> /b -> /c (200): the record for /a must show chain [a, b] and
    // final URL /c, and a redirect_chain issue fires.
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        format!(
            "<html><head><title>Home</title></head><body><h1>Home</h1>\
             <a href=\"{base}/a\">A</a></body></html>"
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/b"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/c"))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/c",
        "<html><head><title>C</title></head><body><h1>C</h1></body></html>".to_string(),
    )
    .await;

    let outcome = run_audit(&test_config(&format!("{base}/"))).await.unwrap();

    let record = outcome.store.get(&format!("{base}/a")).unwrap();
    assert_eq!(
        record.redirect_chain,
        vec![format!("{base}/a"), format!("{base}/b")]
    );
    assert_eq!(record.final_url, format!("{base}/c"));
    assert_eq!(record.http_status, Some(200));

    assert_eq!(kinds_of(&outcome, "redirect_chain").len(), 1);
    assert!(kinds_of(&outcome, "redirect_loop").is_empty());
}

#[tokio::test]
async fn test_duplicate_title_scenario() {
    // Two distinct pages share an identical non-empty title: two issues,
    // each evidencing the full list of affected URLs.
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        format!(
            "<html><head><title>Home</title></head><body><h1>Home</h1>\
             <a href=\"{base}/x\">X</a><a href=\"{base}/y\">Y</a></body></html>"
        ),
    )
    .await;
    for p in ["/x", "/y"] {
        mount_page(
            &server,
            p,
            "<html><head><title>Same Title</title></head><body><h1>H</h1></body></html>"
                .to_string(),
        )
        .await;
    }

    let outcome = run_audit(&test_config(&format!("{base}/"))).await.unwrap();

    let duplicates = kinds_of(&outcome, "duplicate_title");
    assert_eq!(duplicates.len(), 2);
    for issue in &duplicates {
        match issue {
            Issue::DuplicateTitle {
                title, shared_with, ..
            } => {
                assert_eq!(title, "Same Title");
                assert_eq!(
                    shared_with,
                    &vec![format!("{base}/x"), format!("{base}/y")]
                );
            }
            other => panic!("wrong issue: {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_robots_disallow_scenario() {
    // robots.txt disallows /admin; the seed links to /admin/x. That URL is
    // recorded as blocked, never fetched, and contributes an issue.
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /admin"))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/",
        format!(
            "<html><head><title>Home</title></head><body><h1>Home</h1>\
             <a href=\"{base}/admin/x\">Admin</a></body></html>"
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/admin/x"))
        .respond_with(html("<html><body>secret</body></html>".to_string()))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = run_audit(&test_config(&format!("{base}/"))).await.unwrap();

    let record = outcome.store.get(&format!("{base}/admin/x")).unwrap();
    assert!(record.blocked_by_robots);
    assert_eq!(record.blocked_by_robots_rule.as_deref(), Some("/admin"));
    assert_eq!(record.http_status, None);
    assert!(record.internal_outgoing_links.is_empty());
    assert!(outcome.graph.targets(&format!("{base}/admin/x")).is_none());

    let blocked = kinds_of(&outcome, "blocked_by_robots");
    assert_eq!(blocked.len(), 1);
    assert_eq!(blocked[0].primary_url(), format!("{base}/admin/x"));
}

#[tokio::test]
async fn test_noindex_detection() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        format!(
            "<html><head><title>Home</title></head><body><h1>Home</h1>\
             <a href=\"{base}/meta\">M</a><a href=\"{base}/header\">H</a></body></html>"
        ),
    )
    .await;
    mount_page(
        &server,
        "/meta",
        "<html><head><title>M</title>\
         <meta name=\"robots\" content=\"noindex, follow\"></head>\
         <body><h1>M</h1></body></html>"
            .to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/header"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    "<html><head><title>H</title></head><body><h1>H</h1></body></html>".to_string(),
                    "text/html",
                )
                .insert_header("x-robots-tag", "NOINDEX"),
        )
        .mount(&server)
        .await;

    let outcome = run_audit(&test_config(&format!("{base}/"))).await.unwrap();

    let noindex = kinds_of(&outcome, "noindex_page");
    let urls: Vec<&str> = noindex.iter().map(|i| i.primary_url()).collect();
    assert_eq!(urls, vec![format!("{base}/meta"), format!("{base}/header")]);

    // The header value is recorded lowercased.
    let header_record = outcome.store.get(&format!("{base}/header")).unwrap();
    assert_eq!(header_record.x_robots_tag.as_deref(), Some("noindex"));
}

#[tokio::test]
async fn test_page_budget_respected_end_to_end() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        format!(
            "<html><head><title>Home</title></head><body><h1>Home</h1>\
             <a href=\"{base}/p1\">1</a><a href=\"{base}/p2\">2</a>\
             <a href=\"{base}/p3\">3</a></body></html>"
        ),
    )
    .await;
    for p in ["/p1", "/p2", "/p3"] {
        mount_page(
            &server,
            p,
            "<html><head><title>P</title></head><body><h1>P</h1></body></html>".to_string(),
        )
        .await;
    }

    let mut config = test_config(&format!("{base}/"));
    config.crawler.page_budget = PageBudget::Limited(2);
    let outcome = run_audit(&config).await.unwrap();

    let pages = outcome.store.iter().filter(|r| r.is_page()).count();
    assert_eq!(pages, 2);
}

#[tokio::test]
async fn test_zero_link_checks() {
    // /dead-end has no outgoing links; /orphaned is reachable only via the
    // sitemap and so never gets a record (it stays an orphan instead).
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        format!(
            "<html><head><title>Home</title></head><body><h1>Home</h1>\
             <a href=\"{base}/dead-end\">D</a></body></html>"
        ),
    )
    .await;
    mount_page(
        &server,
        "/dead-end",
        "<html><head><title>Dead end</title></head><body><h1>D</h1></body></html>".to_string(),
    )
    .await;

    let outcome = run_audit(&test_config(&format!("{base}/"))).await.unwrap();

    let zero_out = kinds_of(&outcome, "zero_outgoing_links");
    assert_eq!(zero_out.len(), 1);
    assert_eq!(zero_out[0].primary_url(), format!("{base}/dead-end"));

    // The seed is linked by nothing but is exempt from zero-incoming.
    assert!(kinds_of(&outcome, "zero_incoming_links").is_empty());
}

#[tokio::test]
async fn test_failed_fetches_still_produce_full_lists() {
    // /broken serves a 500 and /spin never terminates its redirects; the
    // audit still completes with a record for every URL it touched.
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        format!(
            "<html><head><title>Home</title></head><body><h1>Home</h1>\
             <a href=\"{base}/broken\">B</a><a href=\"{base}/spin\">S</a></body></html>"
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500).insert_header("content-type", "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/spin"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/spin"))
        .mount(&server)
        .await;

    let outcome = run_audit(&test_config(&format!("{base}/"))).await.unwrap();

    assert_eq!(outcome.store.len(), 3);
    // Failures are data on the records, not aborted runs.
    assert!(outcome.store.iter().all(|r| r.resource_type.is_some()));
    assert_eq!(
        outcome.store.get(&format!("{base}/broken")).unwrap().http_status,
        Some(500)
    );
    assert_eq!(
        outcome.store.get(&format!("{base}/spin")).unwrap().fetch_error,
        Some(linkledger::record::FetchError::MaxRedirectsExceeded)
    );
    assert_eq!(kinds_of(&outcome, "broken_page").len(), 1);
    assert_eq!(kinds_of(&outcome, "broken_internal_link").len(), 1);
}

/// Classifier stub that flags every anchor as a mismatch.
struct AlwaysMismatch;

impl Classifier for AlwaysMismatch {
    fn classify<'a>(&'a self, batch: &'a [AnchorCandidate]) -> ClassifyFuture<'a> {
        Box::pin(async move {
            Ok(batch
                .iter()
                .map(|_| Verdict {
                    is_mismatch: true,
                    is_soft_404: false,
                    confidence: 0.95,
                    explanation: "flagged by stub".to_string(),
                })
                .collect())
        })
    }
}

#[tokio::test]
async fn test_classifier_stage_adds_issues_without_changing_core() {
    let server = MockServer::start().await;
    let base = server.uri();

    let body = format!(
        "<html><head><title>Home</title></head><body><h1>Home</h1>\
         <main><a href=\"{base}/promo\">Great offer</a></main></body></html>"
    );
    mount_page(&server, "/", body).await;
    mount_page(
        &server,
        "/promo",
        "<html><head><title>Promo</title></head><body><h1>P</h1></body></html>".to_string(),
    )
    .await;

    let config = test_config(&format!("{base}/"));

    let without = run_audit(&config).await.unwrap();
    let with = run_audit_with_classifier(&config, Some(Arc::new(AlwaysMismatch)))
        .await
        .unwrap();

    let mismatches = kinds_of(&with, "anchor_mismatch");
    assert_eq!(mismatches.len(), 1);

    // Core issues are identical with and without the classifier.
    let core_without: Vec<String> = without.issues.iter().map(|i| i.to_string()).collect();
    let core_with: Vec<String> = with
        .issues
        .iter()
        .filter(|i| i.kind() != "anchor_mismatch" && i.kind() != "soft_error_page")
        .map(|i| i.to_string())
        .collect();
    assert_eq!(core_without, core_with);
}

#[tokio::test]
async fn test_persist_and_reload_round_trip() {
    use linkledger::output::{load_stats, ReportData, RunMeta};
    use linkledger::storage::SqliteStorage;

    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        format!(
            "<html><head><title>Home</title></head><body><h1>Home</h1>\
             <a href=\"{base}/a\">A</a></body></html>"
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(404).insert_header("content-type", "text/html"))
        .mount(&server)
        .await;

    let outcome = run_audit(&test_config(&format!("{base}/"))).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("audit.db");
    let mut storage = SqliteStorage::new(&db_path).unwrap();
    let run_id = storage
        .save_run(
            &outcome.seed_url,
            "hash",
            "2024-05-01T10:00:00Z",
            "2024-05-01T10:01:00Z",
            &outcome.store,
            &outcome.graph,
            &outcome.issues,
        )
        .unwrap();

    let stats = load_stats(&storage).unwrap();
    assert_eq!(stats.run_id, run_id);
    assert_eq!(stats.record_count, outcome.store.len() as u64);
    assert_eq!(stats.issue_count, outcome.issues.len() as u64);

    // A report rendered from storage matches the live shape.
    let run = storage.latest_run().unwrap();
    let pages = storage.run_pages(run_id).unwrap();
    let issues = storage.run_issues(run_id).unwrap();
    let edges = storage.link_count(run_id).unwrap();
    let stored = ReportData::from_stored(&run, pages, issues, edges);
    let live = ReportData::from_outcome(
        &outcome,
        RunMeta {
            config_hash: "hash".to_string(),
            started_at: "2024-05-01T10:00:00Z".to_string(),
            finished_at: "2024-05-01T10:01:00Z".to_string(),
        },
    );
    assert_eq!(stored.pages.len(), live.pages.len());
    assert_eq!(stored.issues.len(), live.issues.len());
    assert_eq!(stored.edge_count, live.edge_count);
}
