mod common;

use corpus_common::{Category, CorpusRecord, LinkRecord};
use corpus_store::{CorpusWriter, Ledger};
use corpus_web::{StageError, download_content};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn article_html(headline: Option<&str>, body: Option<&str>) -> String {
    let h = headline
        .map(|h| format!(r#"<h1 itemprop="headline">{h}</h1>"#))
        .unwrap_or_default();
    let b = body
        .map(|b| format!(r#"<div itemprop="articleBody"><p>{b}</p><p>تتمة</p></div>"#))
        .unwrap_or_default();
    format!("<html><body>{h}{b}</body></html>")
}

async fn mount_article(server: &MockServer, route: &str, status: u16, body: String, hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_raw(body, "text/html; charset=utf-8"))
        .expect(hits)
        .mount(server)
        .await;
}

fn seed_ledger(ledger: &Ledger, addresses: &[String]) -> anyhow::Result<()> {
    let records: Vec<LinkRecord> = addresses
        .iter()
        .enumerate()
        .map(|(i, a)| LinkRecord::new("altibbi.com", Category::News, 1, i, a.clone()))
        .collect();
    ledger.append(&records)?;
    Ok(())
}

fn seed_corpus(path: &std::path::Path, addresses: &[String]) -> anyhow::Result<()> {
    let mut w = CorpusWriter::open_append(path)?;
    for a in addresses {
        w.append(&CorpusRecord {
            address: a.clone(),
            headline: Some("سابق".into()),
            body: Some("محتوى سابق".into()),
        })?;
    }
    Ok(())
}

#[tokio::test]
async fn only_addresses_missing_from_store_are_fetched() -> anyhow::Result<()> {
    common::init_test_tracing();
    let server = MockServer::start().await;
    let base = server.uri();

    let tmp = tempfile::tempdir()?;
    let ctx = common::context_for(&base, tmp.path())?;

    seed_corpus(
        &ctx.layout.raw_file("corpus.csv"),
        &[format!("{base}/old/1"), format!("{base}/old/2")],
    )?;
    seed_ledger(
        &Ledger::new(ctx.layout.raw_file("links.txt")),
        &[
            format!("{base}/old/2"),
            format!("{base}/new/1"),
            format!("{base}/new/2"),
        ],
    )?;

    mount_article(&server, "/old/2", 200, article_html(Some("x"), Some("y")), 0).await;
    mount_article(&server, "/new/1", 200, article_html(Some("عنوان"), Some("نص")), 1).await;
    mount_article(&server, "/new/2", 200, article_html(None, Some("بدون عنوان")), 1).await;

    let report = download_content(&ctx, "links.txt", "corpus.csv").await?;

    assert_eq!(report.processed, 2);
    assert_eq!(report.errors, 0);
    assert_eq!(report.already_stored, 1);
    assert_eq!(report.records.len(), 4);

    let new1 = &report.records[2];
    assert_eq!(new1.address, format!("{base}/new/1"));
    assert_eq!(new1.headline.as_deref(), Some("عنوان"));
    assert_eq!(new1.body.as_deref(), Some("نص تتمة"));
    assert_eq!(report.records[3].headline, None);

    let raw = std::fs::read_to_string(ctx.layout.raw_file("corpus.csv"))?;
    assert_eq!(raw.matches("link,headline,articleBody").count(), 1);
    Ok(())
}

#[tokio::test]
async fn failures_are_counted_and_retried_on_next_run() -> anyhow::Result<()> {
    common::init_test_tracing();
    let server = MockServer::start().await;
    let base = server.uri();

    let tmp = tempfile::tempdir()?;
    let ctx = common::context_for(&base, tmp.path())?;
    seed_ledger(
        &Ledger::new(ctx.layout.raw_file("links.txt")),
        &[format!("{base}/gone"), format!("{base}/ok")],
    )?;

    mount_article(&server, "/gone", 404, String::new(), 2).await;
    mount_article(&server, "/ok", 200, article_html(Some("h"), Some("b")), 1).await;

    let first = download_content(&ctx, "links.txt", "corpus.csv").await?;
    assert_eq!(first.processed, 1);
    assert_eq!(first.errors, 1);

    // the stored address is not fetched again; the failed one is
    let second = download_content(&ctx, "links.txt", "corpus.csv").await?;
    assert_eq!(second.processed, 0);
    assert_eq!(second.errors, 1);
    assert_eq!(second.records.len(), 1);
    Ok(())
}

#[tokio::test]
async fn missing_ledger_means_nothing_to_do() -> anyhow::Result<()> {
    common::init_test_tracing();
    let server = MockServer::start().await;

    let tmp = tempfile::tempdir()?;
    let ctx = common::context_for(&server.uri(), tmp.path())?;
    let report = download_content(&ctx, "absent.txt", "corpus.csv").await?;

    assert_eq!(report.processed, 0);
    assert!(report.records.is_empty());
    // store is created with its header so later runs append to it
    let raw = std::fs::read_to_string(ctx.layout.raw_file("corpus.csv"))?;
    assert_eq!(raw.trim_end(), "link,headline,articleBody");
    Ok(())
}

#[tokio::test]
async fn unwritable_store_aborts_the_stage() -> anyhow::Result<()> {
    common::init_test_tracing();
    let server = MockServer::start().await;
    let base = server.uri();

    let tmp = tempfile::tempdir()?;
    let ctx = common::context_for(&base, tmp.path())?;
    seed_ledger(
        &Ledger::new(ctx.layout.raw_file("links.txt")),
        &[format!("{base}/never")],
    )?;
    mount_article(&server, "/never", 200, article_html(Some("h"), Some("b")), 0).await;

    let res = download_content(&ctx, "links.txt", "no-dir/corpus.csv").await;
    assert!(matches!(res, Err(StageError::Store(_))));
    Ok(())
}

#[tokio::test]
async fn malformed_store_is_treated_as_empty_prior_state() -> anyhow::Result<()> {
    common::init_test_tracing();
    let server = MockServer::start().await;
    let base = server.uri();

    let tmp = tempfile::tempdir()?;
    let ctx = common::context_for(&base, tmp.path())?;
    let corpus_path = ctx.layout.raw_file("corpus.csv");
    std::fs::write(&corpus_path, format!("url,title\n{base}/a,قديم\n"))?;
    seed_ledger(
        &Ledger::new(ctx.layout.raw_file("links.txt")),
        &[format!("{base}/a")],
    )?;
    // the unreadable store cannot prove /a was stored, so it is fetched
    mount_article(&server, "/a", 200, article_html(Some("h"), Some("b")), 1).await;

    let report = download_content(&ctx, "links.txt", "corpus.csv").await?;

    assert_eq!(report.already_stored, 0);
    assert_eq!(report.processed, 1);
    assert!(report.records.is_empty());
    let raw = std::fs::read_to_string(&corpus_path)?;
    assert!(raw.starts_with("url,title\n"));
    Ok(())
}
