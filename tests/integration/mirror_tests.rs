use std::fs;
use std::path::PathBuf;
use sumi_mirror::config::{validate, Config};
use sumi_mirror::output::AssetOutcome;
use sumi_mirror::{Mirror, PageState, PathMapper};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

fn config_for(server: &MockServer, output: &TempDir) -> Config {
    Config {
        url: format!("{}/", server.uri()),
        output_directory: output.path().to_path_buf(),
        ..Config::default()
    }
}

/// Directory the mirror of `server` is written into
fn site_directory(server: &MockServer, output: &TempDir) -> PathBuf {
    let root = Url::parse(&server.uri()).unwrap();
    PathMapper::new(output.path(), &root).site_directory()
}

/// Directory name external assets from `server` are nested under
fn external_directory(server: &MockServer) -> String {
    let url = Url::parse(&server.uri()).unwrap();
    format!("_{}_{}", url.host_str().unwrap(), url.port().unwrap())
}

async fn run(config: &Config) -> (u64, u64) {
    let settings = validate(config).unwrap();
    let mut mirror = Mirror::new(settings).unwrap();
    let stats = mirror.run().await.unwrap();
    (
        stats.pages(PageState::RewrittenAndWritten),
        stats.pages(PageState::Failed),
    )
}

#[tokio::test]
async fn test_depth_limited_mirror_with_assets() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/",
        html(
            r#"<html><head>
                <link rel="stylesheet" href="/css/site.css">
                <script src="/js/app.js"></script>
            </head><body>
                <img src="/img/logo.png" srcset="/img/logo.png 1x, /img/logo-2x.png 2x">
                <a href="/about.html">About</a>
                <a href="http://external.test/x">Elsewhere</a>
            </body></html>"#,
        ),
        1,
    )
    .await;
    mount(
        &server,
        "/about.html",
        html(r#"<html><body><a href="/deep.html">Deeper</a><a href="/">Home</a></body></html>"#),
        1,
    )
    .await;
    mount(&server, "/deep.html", html("<html></html>"), 0).await;
    mount(
        &server,
        "/css/site.css",
        ResponseTemplate::new(200).set_body_string("body { background: url(../img/bg.png) }"),
        1,
    )
    .await;
    mount(&server, "/js/app.js", ResponseTemplate::new(200).set_body_string("run()"), 1).await;
    mount(&server, "/img/logo.png", ResponseTemplate::new(200).set_body_bytes(b"logo".to_vec()), 1).await;
    mount(&server, "/img/logo-2x.png", ResponseTemplate::new(200).set_body_bytes(b"logo2x".to_vec()), 1).await;
    mount(&server, "/img/bg.png", ResponseTemplate::new(200).set_body_bytes(b"bg".to_vec()), 1).await;

    let output = TempDir::new().unwrap();
    let config = Config {
        max_depth: 1,
        ..config_for(&server, &output)
    };

    let (written, failed) = run(&config).await;
    assert_eq!(written, 2);
    assert_eq!(failed, 0);

    let site = site_directory(&server, &output);
    let index = fs::read_to_string(site.join("index.html")).unwrap();
    assert!(index.contains(r#"href="about.html""#));
    assert!(index.contains(r#"href="http://external.test/x""#));
    assert!(index.contains(r#"href="css/site.css""#));
    assert!(index.contains(r#"src="img/logo.png""#));
    assert!(index.contains("img/logo.png 1x,\nimg/logo-2x.png 2x"));

    let about = fs::read_to_string(site.join("about.html")).unwrap();
    assert!(about.contains(r#"href="deep.html""#));
    assert!(about.contains(r#"href="index.html""#));
    assert!(!site.join("deep.html").exists());

    let css = fs::read_to_string(site.join("css/site.css")).unwrap();
    assert!(css.contains(r#"url("../img/bg.png")"#));
    assert_eq!(fs::read(site.join("img/bg.png")).unwrap(), b"bg");
    assert_eq!(fs::read_to_string(site.join("js/app.js")).unwrap(), "run()");
}

#[tokio::test]
async fn test_rerun_rewrites_pages_without_refetching_assets() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/",
        html(r#"<html><body><img src="/img/a.png"><script src="/app.js"></script></body></html>"#),
        2,
    )
    .await;
    mount(&server, "/img/a.png", ResponseTemplate::new(200).set_body_bytes(b"a".to_vec()), 1).await;
    mount(&server, "/app.js", ResponseTemplate::new(200).set_body_string("x"), 1).await;

    let output = TempDir::new().unwrap();
    let config = config_for(&server, &output);
    let index = site_directory(&server, &output).join("index.html");

    run(&config).await;
    fs::write(&index, "stale").unwrap();

    let settings = validate(&config).unwrap();
    let mut mirror = Mirror::new(settings).unwrap();
    let stats = mirror.run().await.unwrap();

    assert_eq!(stats.assets(AssetOutcome::AlreadyOnDisk), 2);
    assert_eq!(stats.assets(AssetOutcome::Downloaded), 0);
    assert!(fs::read_to_string(&index).unwrap().contains("img/a.png"));
}

#[tokio::test]
async fn test_each_page_is_fetched_once() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/",
        html(
            r##"<a href="/a.html">A</a>
                <a href="a.html">A again</a>
                <a href="/a.html#section">A section</a>
                <a href="/b.html">B</a>"##,
        ),
        1,
    )
    .await;
    mount(
        &server,
        "/a.html",
        html(r#"<a href="/">Home</a><a href="/b.html">B</a><a href="/a.html">Self</a>"#),
        1,
    )
    .await;
    mount(&server, "/b.html", html(r#"<a href="/a.html">A</a>"#), 1).await;

    let output = TempDir::new().unwrap();
    let (written, _) = run(&config_for(&server, &output)).await;

    assert_eq!(written, 3);
}

#[tokio::test]
async fn test_include_and_exclude_patterns() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/",
        html(
            r#"<a href="/about.html">About</a>
               <a href="/blog/post1">Post</a>
               <a href="/blog/drafts/x">Draft</a>"#,
        ),
        1,
    )
    .await;
    mount(&server, "/about.html", html("about"), 0).await;
    mount(&server, "/blog/post1", html("post"), 1).await;
    mount(&server, "/blog/drafts/x", html("draft"), 0).await;

    let output = TempDir::new().unwrap();
    let config = Config {
        includes: vec!["^/blog/".to_string()],
        excludes: vec!["^/blog/drafts/".to_string()],
        ..config_for(&server, &output)
    };

    let (written, _) = run(&config).await;
    assert_eq!(written, 2);
    assert!(site_directory(&server, &output).join("blog/post1").exists());
}

#[tokio::test]
async fn test_root_redirect_is_adopted() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/",
        ResponseTemplate::new(302).insert_header("location", "/home/"),
        1,
    )
    .await;
    mount(
        &server,
        "/home/",
        html(r#"<a href="page.html">Page</a><a href="/">Root</a>"#),
        1,
    )
    .await;
    mount(&server, "/home/page.html", html(r#"<a href="/home/">Back</a>"#), 1).await;

    let output = TempDir::new().unwrap();
    let settings = validate(&config_for(&server, &output)).unwrap();
    let mut mirror = Mirror::new(settings).unwrap();
    mirror.run().await.unwrap();

    assert_eq!(mirror.root().path(), "/home/");

    let site = site_directory(&server, &output);
    let home = fs::read_to_string(site.join("home/index.html")).unwrap();
    assert!(home.contains(r#"href="../home/page.html""#));
    assert!(site.join("home/page.html").exists());
}

#[tokio::test]
async fn test_failed_pages_do_not_stop_the_run() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/",
        html(r#"<a href="/missing.html">Gone</a><a href="/ok.html">Ok</a>"#),
        1,
    )
    .await;
    mount(&server, "/missing.html", ResponseTemplate::new(404), 1).await;
    mount(&server, "/ok.html", html("fine"), 1).await;

    let output = TempDir::new().unwrap();
    let (written, failed) = run(&config_for(&server, &output)).await;

    assert_eq!(written, 2);
    assert_eq!(failed, 1);
    assert!(!site_directory(&server, &output).join("missing.html").exists());
}

#[tokio::test]
async fn test_redirected_pages_stay_at_requested_path() {
    let server = MockServer::start().await;
    let elsewhere = MockServer::start().await;

    mount(
        &server,
        "/",
        html(r#"<a href="/old.html">Old</a><a href="/gone.html">Gone</a>"#),
        1,
    )
    .await;
    mount(
        &server,
        "/old.html",
        ResponseTemplate::new(301).insert_header("location", "/new/"),
        1,
    )
    .await;
    mount(&server, "/new/", html("<p>moved</p>"), 1).await;

    let target = format!("{}/landing.html", elsewhere.uri());
    mount(
        &server,
        "/gone.html",
        ResponseTemplate::new(302).insert_header("location", target.as_str()),
        1,
    )
    .await;
    mount(&elsewhere, "/landing.html", html("<p>elsewhere</p>"), 1).await;

    let output = TempDir::new().unwrap();
    let (written, failed) = run(&config_for(&server, &output)).await;
    assert_eq!(written, 3);
    assert_eq!(failed, 0);

    let site = site_directory(&server, &output);
    let index = fs::read_to_string(site.join("index.html")).unwrap();
    assert!(index.contains(r#"href="old.html""#));
    assert!(fs::read_to_string(site.join("old.html")).unwrap().contains("moved"));
    assert!(!site.join("new").exists());

    assert!(fs::read_to_string(site.join("gone.html")).unwrap().contains("elsewhere"));
    assert!(!site.join(external_directory(&elsewhere)).exists());
}

#[tokio::test]
async fn test_external_asset_is_downloaded_once() {
    let server = MockServer::start().await;
    let cdn = MockServer::start().await;

    let script = format!("{}/lib/app.js", cdn.uri());
    mount(
        &server,
        "/",
        html(&format!(
            r#"<script src="{script}"></script><a href="/docs/guide.html">Guide</a>"#
        )),
        1,
    )
    .await;
    mount(
        &server,
        "/docs/guide.html",
        html(&format!(r#"<script src="{script}"></script>"#)),
        1,
    )
    .await;
    mount(&cdn, "/lib/app.js", ResponseTemplate::new(200).set_body_string("lib()"), 1).await;

    let output = TempDir::new().unwrap();
    let settings = validate(&config_for(&server, &output)).unwrap();
    let mut mirror = Mirror::new(settings).unwrap();
    let stats = mirror.run().await.unwrap();
    assert_eq!(stats.assets(AssetOutcome::Downloaded), 1);

    let site = site_directory(&server, &output);
    let cdn_dir = external_directory(&cdn);
    assert_eq!(
        fs::read_to_string(site.join(&cdn_dir).join("lib/app.js")).unwrap(),
        "lib()"
    );

    let index = fs::read_to_string(site.join("index.html")).unwrap();
    assert!(index.contains(&format!(r#"src="{cdn_dir}/lib/app.js""#)));
    let guide = fs::read_to_string(site.join("docs/guide.html")).unwrap();
    assert!(guide.contains(&format!(r#"src="../{cdn_dir}/lib/app.js""#)));
}

#[tokio::test]
async fn test_external_references_without_local_copy_stay_absolute() {
    let server = MockServer::start().await;
    let cdn = MockServer::start().await;

    let missing = format!("{}/missing.png", cdn.uri());
    let stylesheet = format!("{}/css/theme.css", cdn.uri());
    mount(
        &server,
        "/",
        html(&format!(
            r#"<head>
                <link rel="canonical" href="https://other.test/page">
                <link rel="preconnect" href="{cdn}">
                <link rel="stylesheet" href="{stylesheet}">
            </head><body><img src="{missing}"></body>"#,
            cdn = cdn.uri(),
        )),
        1,
    )
    .await;
    mount(
        &cdn,
        "/css/theme.css",
        ResponseTemplate::new(200)
            .set_body_string("a { background: url(../missing.png) } b { background: url(ok.png) }"),
        1,
    )
    .await;
    mount(&cdn, "/css/ok.png", ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()), 1).await;
    mount(&cdn, "/missing.png", ResponseTemplate::new(404), 1).await;

    let output = TempDir::new().unwrap();
    run(&config_for(&server, &output)).await;

    let site = site_directory(&server, &output);
    let cdn_dir = external_directory(&cdn);
    let index = fs::read_to_string(site.join("index.html")).unwrap();
    assert!(index.contains(r#"href="https://other.test/page""#));
    assert!(index.contains(&format!(r#"href="{}""#, cdn.uri())));
    assert!(index.contains(&format!(r#"href="{cdn_dir}/css/theme.css""#)));
    assert!(index.contains(&format!(r#"src="{missing}""#)));

    let css = fs::read_to_string(site.join(&cdn_dir).join("css/theme.css")).unwrap();
    assert!(css.contains("url(../missing.png)"));
    assert!(css.contains(r#"url("../../_"#));
    assert!(site.join(&cdn_dir).join("css/ok.png").exists());
}
