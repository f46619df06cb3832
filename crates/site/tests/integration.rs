//! Integration tests for mscrape-site: structure walks over fake pages

use mscrape_errors::{Error, SiteError};
use mscrape_site::{Page, PageUrlInfo, SiteConfig, SiteDefinition, UrlCommand};

fn site(toml: &str) -> SiteConfig {
    let def: SiteDefinition = toml::from_str(toml).unwrap();
    SiteConfig::from_definition(def).unwrap()
}

fn page(url: &str, body: &str) -> Page {
    Page::new(url, body).unwrap()
}

fn downloads(commands: &[UrlCommand]) -> Vec<(&str, &str)> {
    commands
        .iter()
        .filter_map(|c| match c {
            UrlCommand::Download { url, file_path } => Some((url.as_str(), file_path.as_str())),
            _ => None,
        })
        .collect()
}

fn requests(commands: &[UrlCommand]) -> Vec<&PageUrlInfo> {
    commands
        .iter()
        .filter_map(|c| match c {
            UrlCommand::Request(info) => Some(info),
            _ => None,
        })
        .collect()
}

#[test]
fn leaf_links_become_downloads() {
    let config = site(r#"
        start_url = "http://example.com/"
        save_dir = "/tmp/media"
        structure = [
            { url = 'http://example\.com/', file_path = "foo" },
            { url = 'http://example\.com/contents/(\w+)', file_path = "$1.txt" },
        ]
    "#);

    let page = page(
        "http://example.com/",
        r#"<a href="/contents/foo">foo</a><a href="/contents/bar">bar</a>"#,
    );
    let commands = config.url_commands(&page, None).unwrap();
    assert_eq!(
        downloads(&commands),
        [
            ("http://example.com/contents/foo", "foo/foo.txt"),
            ("http://example.com/contents/bar", "foo/bar.txt"),
        ]
    );
}

#[test]
fn file_content_saves_json_array() {
    let config = site(r#"
        start_url = "http://example.com/"
        save_dir = "/tmp/media"
        structure = [
            { url = 'http://example\.com/', file_path = "test.json", file_content = "p" },
        ]
    "#);

    let page = page(
        "http://example.com/",
        "<p>foo</p> <p>bar</p> <div>baz</div>",
    );
    let commands = config.url_commands(&page, None).unwrap();
    assert_eq!(commands.len(), 1);
    match &commands[0] {
        UrlCommand::SaveContent { file_path, content } => {
            assert_eq!(file_path, "test.json");
            assert_eq!(content, &serde_json::to_vec(&["foo", "bar"]).unwrap());
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn file_content_on_inner_node_rejected() {
    let def: SiteDefinition = toml::from_str(
        r#"
        start_url = "http://example.com/"
        save_dir = "/tmp/media"
        structure = [
            { url = 'http://example\.com/', file_content = "p" },
            { url = 'http://example\.com/foo' },
        ]
        "#,
    )
    .unwrap();
    let err = SiteConfig::from_definition(def).unwrap_err();
    assert!(matches!(err, Error::Site(SiteError::FileContentOnInnerNode)));
}

#[test]
fn leaf_reached_by_request_saves_raw_body() {
    // A single chain node: the start page itself is the file
    let config = site(r#"
        start_url = "http://example.com/data"
        save_dir = "/tmp/media"
        structure = [
            { url = 'http://example\.com/data', file_path = "data.html" },
        ]
    "#);

    let body = "<html><body>raw</body></html>";
    let page = page("http://example.com/data", body);
    let commands = config.url_commands(&page, None).unwrap();
    assert_eq!(commands.len(), 1);
    match &commands[0] {
        UrlCommand::SaveContent { file_path, content } => {
            assert_eq!(file_path, "data.html");
            assert_eq!(content, body.as_bytes());
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn paging_follows_next_page_under_fresh_path() {
    let config = site(r#"
        start_url = "http://example.com/"
        save_dir = "/tmp/media"
        structure = [
            { url = 'http://example\.com/(\?page=(?P<num>\d+))?', file_path = "p${num}", paging = true },
            { url = 'http://example\.com/contents/(\w+)', file_path = "$1.txt" },
        ]
    "#);

    let first = page(
        "http://example.com/",
        r#"<a href="/contents/foo">foo</a><a href="/contents/bar">bar</a><a href="/?page=2">next</a>"#,
    );
    let commands = config.url_commands(&first, None).unwrap();
    assert_eq!(
        downloads(&commands),
        [
            ("http://example.com/contents/foo", "p/foo.txt"),
            ("http://example.com/contents/bar", "p/bar.txt"),
        ]
    );
    let reqs = requests(&commands);
    assert_eq!(reqs.len(), 1);
    let next = reqs[0];
    assert_eq!(next.url, "http://example.com/?page=2");
    assert_eq!(next.structure_path, [0]);
    assert_eq!(next.file_path, "p2");
    assert_eq!(next.link_text, "next");

    // Walk the second listing page with the carried info
    let second = page(
        "http://example.com/?page=2",
        r#"<a href="/contents/aaa">aaa</a><a href="/?page=3">next</a>"#,
    );
    let commands = config.url_commands(&second, Some(next)).unwrap();
    assert_eq!(
        downloads(&commands),
        [("http://example.com/contents/aaa", "p2/aaa.txt")]
    );
    let reqs = requests(&commands);
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].url, "http://example.com/?page=3");
    assert_eq!(reqs[0].file_path, "p3");
}

#[test]
fn branch_alternatives_match_independently() {
    let config = site(r#"
        start_url = "http://example.com/"
        save_dir = "/tmp/media"
        structure = [
            [
                [
                    { url = 'http://example\.com/not_matched', file_path = "foo" },
                    { url = 'http://example\.com/not_matched/contents/(\w+)', file_path = "$1.txt" },
                ],
                [
                    { url = 'http://example\.com/', file_path = "bar" },
                    { url = 'http://example\.com/contents/(\w+)', file_path = "$1.txt" },
                ],
            ],
        ]
    "#);

    let page = page(
        "http://example.com/",
        r#"<a href="/contents/foo">foo</a><a href="/contents/bar">bar</a>"#,
    );
    let commands = config.url_commands(&page, None).unwrap();
    assert_eq!(
        downloads(&commands),
        [
            ("http://example.com/contents/foo", "bar/foo.txt"),
            ("http://example.com/contents/bar", "bar/bar.txt"),
        ]
    );
}

#[test]
fn start_url_must_match_a_root_node() {
    let config = site(r#"
        start_url = "http://example.com/"
        save_dir = "/tmp/media"
        structure = [
            { url = 'http://example\.com/elsewhere' },
        ]
    "#);

    let page = page("http://example.com/", "<a href='/contents/foo'>foo</a>");
    let err = config.url_commands(&page, None).unwrap_err();
    match err {
        Error::Site(SiteError::StartUrlNotMatched { matchers, .. }) => {
            assert!(matchers.contains(r"http://example\.com/elsewhere"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn as_url_rewrites_download_targets() {
    let config = site(r#"
        start_url = "http://example.com/"
        save_dir = "/tmp/media"
        structure = [
            { url = 'http://example\.com/', file_path = "foo" },
            { url = 'http://example\.com/contents/(\w+)', as_url = "http://cdn.example.com/images/$1.jpg", file_path = "$1.jpg" },
        ]
    "#);

    let page = page(
        "http://example.com/",
        r#"<a href="/contents/foo">foo</a><a href="/contents/bar">bar</a>"#,
    );
    let commands = config.url_commands(&page, None).unwrap();
    assert_eq!(
        downloads(&commands),
        [
            ("http://cdn.example.com/images/foo.jpg", "foo/foo.jpg"),
            ("http://cdn.example.com/images/bar.jpg", "foo/bar.jpg"),
        ]
    );
}

#[test]
fn content_selector_limits_followed_links() {
    let config = site(r#"
        start_url = "http://example.com/"
        save_dir = "/tmp/media"
        structure = [
            { url = 'http://example\.com/', content = "section.main-content", file_path = "foo" },
            { url = 'http://example\.com/contents/(\w+\.jpg)', file_path = "$1" },
        ]
    "#);

    let page = page(
        "http://example.com/",
        r#"
        <section class="navigation"><a href="/contents/nav1.jpg">nav1</a></section>
        <section class="main-content"><a href="/contents/foo.jpg">foo</a></section>
        <section class="main-content"><a href="/contents/bar.jpg">bar</a></section>
        <section class="navigation"><a href="/contents/nav2.jpg">nav2</a></section>
        "#,
    );
    let commands = config.url_commands(&page, None).unwrap();
    assert_eq!(
        downloads(&commands),
        [
            ("http://example.com/contents/foo.jpg", "foo/foo.jpg"),
            ("http://example.com/contents/bar.jpg", "foo/bar.jpg"),
        ]
    );
}

#[test]
fn assertions_gate_the_walk() {
    let passing = site(r#"
        start_url = "http://example.com/"
        save_dir = "/tmp/media"
        structure = [
            { url = 'http://example\.com/', file_path = "foo", assert = "a.present" },
            { url = 'http://example\.com/contents/(\w+)', file_path = "$1.jpg" },
        ]
    "#);
    let body = r#"<a class="present" href="/contents/foo">foo</a>"#;
    let commands = passing
        .url_commands(&page("http://example.com/", body), None)
        .unwrap();
    assert_eq!(downloads(&commands).len(), 1);

    let failing = site(r#"
        start_url = "http://example.com/"
        save_dir = "/tmp/media"
        structure = [
            { url = 'http://example\.com/', file_path = "foo", assert = ["a.present", "a.missing"] },
            { url = 'http://example\.com/contents/(\w+)', file_path = "$1.jpg" },
        ]
    "#);
    let err = failing
        .url_commands(&page("http://example.com/", body), None)
        .unwrap_err();
    match err {
        Error::Site(SiteError::AssertionFailed { selector, .. }) => {
            assert_eq!(selector, "a.missing");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn matcherless_nodes_forward_without_a_request() {
    // The middle node has no url matcher: it only contributes a path
    // component and its children are evaluated against the same page.
    let config = site(r#"
        start_url = "http://example.com/"
        save_dir = "/tmp/media"
        structure = [
            { url = 'http://example\.com/', file_path = "root" },
            { file_path = "grouped" },
            { url = 'http://example\.com/files/(\w+\.txt)', file_path = "$1" },
        ]
    "#);

    let page = page(
        "http://example.com/",
        r#"<a href="/files/aaa.txt">aaa</a>"#,
    );
    let commands = config.url_commands(&page, None).unwrap();
    assert_eq!(
        downloads(&commands),
        [("http://example.com/files/aaa.txt", "root/grouped/aaa.txt")]
    );
}

#[test]
fn unsafe_path_component_rejected() {
    let config = site(r#"
        start_url = "http://example.com/"
        save_dir = "/tmp/media"
        structure = [
            { url = 'http://example\.com/', file_path = "foo" },
            { url = 'http://example\.com/files\?name=(.+)', file_path = "$1" },
        ]
    "#);

    // Dot segments in the query survive URL resolution untouched
    let page = page(
        "http://example.com/",
        r#"<a href="/files?name=../../etc/passwd">escape</a>"#,
    );
    let err = config.url_commands(&page, None).unwrap_err();
    assert!(matches!(
        err,
        Error::Site(SiteError::UnsafePathComponent { .. })
    ));
}

#[test]
fn nested_request_carries_structure_path() {
    let config = site(r#"
        start_url = "http://example.com/"
        save_dir = "/tmp/media"
        structure = [
            'http://example\.com/',
            { url = 'http://example\.com/(\w+)_dir', file_path = "$1" },
            { url = 'http://example\.com/files/(\w+\.txt)', file_path = "$1" },
        ]
    "#);

    let listing = page(
        "http://example.com/",
        r#"<a href="/aaa_dir">dir1</a><a href="/bbb_dir">dir2</a>"#,
    );
    let commands = config.url_commands(&listing, None).unwrap();
    let reqs = requests(&commands);
    assert_eq!(reqs.len(), 2);
    assert_eq!(reqs[0].url, "http://example.com/aaa_dir");
    assert_eq!(reqs[0].structure_path, [0, 0]);
    assert_eq!(reqs[0].file_path, "aaa");

    let inner = page(
        "http://example.com/aaa_dir",
        r#"<a href="/files/one.txt">one</a>"#,
    );
    let commands = config.url_commands(&inner, Some(reqs[0])).unwrap();
    assert_eq!(
        downloads(&commands),
        [("http://example.com/files/one.txt", "aaa/one.txt")]
    );
}
