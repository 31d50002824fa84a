//! End-to-end tests for the mobilize filter
//!
//! Parse → rewrite → serialize, checking the exact markup produced and the
//! counters published. Shapes an HTML5 parser would normalize away (several
//! heads or bodies, a missing head) are built directly on the tree.

use mob_dom::DomTree;
use mob_html::{HtmlSerializer, parse, serialize};
use mob_rewrite::{
    InMemoryStatistics, MOBILE_ROLE_ATTRIBUTE, MobilizeCounter, MobilizeRewriteFilter,
    RewriteConfig, Statistics,
};

const PHONE_NUMBER: &str = "16175551212";
const CONVERSION_ID: i64 = 42;
const PHONE_CONVERSION_LABEL: &str = "HelloWorld";
const BEACON_URL: &str = "/beacon";

// ============================================================================
// HARNESS
// ============================================================================

struct Harness {
    config: RewriteConfig,
    stats: InMemoryStatistics,
    progress_added: bool,
}

impl Harness {
    fn new(layout: bool) -> Self {
        let mut stats = InMemoryStatistics::new();
        MobilizeRewriteFilter::init_stats(&mut stats);
        Self {
            config: RewriteConfig {
                always: true,
                phone_number: PHONE_NUMBER.into(),
                conversion_id: CONVERSION_ID,
                conversion_label: PHONE_CONVERSION_LABEL.into(),
                beacon_url: BEACON_URL.into(),
                layout,
                nav: true,
                ..Default::default()
            },
            stats,
            // The progress scrim is left out unless a test asks for it
            progress_added: true,
        }
    }

    fn filter(&self) -> MobilizeRewriteFilter<'_> {
        let mut filter = MobilizeRewriteFilter::new(&self.config, &self.stats);
        filter.set_progress_added(self.progress_added);
        filter
    }

    fn rewrite_html(&self, html: &str) -> String {
        let mut doc = parse(html);
        self.filter().rewrite_document(&mut doc).unwrap();
        serialize(&doc)
    }

    fn rewrite_tree(&self, tree: &mut DomTree) -> String {
        self.filter().rewrite(tree).unwrap();
        HtmlSerializer::new().serialize_document(tree)
    }

    fn counter(&self, counter: MobilizeCounter) -> i64 {
        self.stats.get(counter.name())
    }

    fn check_counters(
        &self,
        keeper: i64,
        header: i64,
        nav: i64,
        content: i64,
        marginal: i64,
        deleted: i64,
    ) {
        assert_eq!(self.counter(MobilizeCounter::PagesMobilized), 1, "pages");
        assert_eq!(self.counter(MobilizeCounter::KeeperBlocks), keeper, "keeper");
        assert_eq!(self.counter(MobilizeCounter::HeaderBlocks), header, "header");
        assert_eq!(self.counter(MobilizeCounter::NavigationalBlocks), nav, "navigational");
        assert_eq!(self.counter(MobilizeCounter::ContentBlocks), content, "content");
        assert_eq!(self.counter(MobilizeCounter::MarginalBlocks), marginal, "marginal");
        assert_eq!(self.counter(MobilizeCounter::DeletedElements), deleted, "deleted");
    }

    fn head_and_viewport(&self) -> String {
        let mut out = format!("<meta itemprop=\"telephone\" content=\"{PHONE_NUMBER}\">");
        if self.config.layout {
            out.push_str(
                "<meta name=\"viewport\" content=\"width=device-width\">\
                 <script src=\"/psajs/mobilize_xhr.0.js\"></script>",
            );
        }
        out
    }

    fn styles(&self) -> String {
        let mut out = String::from("<link rel=\"stylesheet\" href=\"/psajs/mobilize_css.0.css\">");
        if self.config.layout {
            out.push_str("<link rel=\"stylesheet\" href=\"/psajs/mobilize_layout_css.0.css\">");
        }
        out
    }

    fn scripts_at_end_of_body_with(&self, bg_color: &str, fg_color: &str) -> String {
        format!(
            "<script src=\"/psajs/mobilize.0.js\"></script>\
             <script>window.psDebugMode=false;window.psNavMode=true;\
             window.psLabeledMode=false;window.psConfigMode=false;\
             window.psLayoutMode={};window.psStaticJs=false;\
             window.psDeviceType='mobile';\
             window.psConversionId='{CONVERSION_ID}';window.psPhoneNumber='{PHONE_NUMBER}';\
             window.psPhoneConversionLabel='{PHONE_CONVERSION_LABEL}';\
             window.psMobBackgroundColor={bg_color};window.psMobForegroundColor={fg_color};\
             window.psMobBeaconUrl='{BEACON_URL}';psStartMobilization();</script>",
            self.config.layout
        )
    }

    fn scripts_at_end_of_body(&self) -> String {
        self.scripts_at_end_of_body_with("null", "null")
    }

    fn expected_body(&self) -> String {
        format!(
            "<body>{}hello, world!{}</body>",
            spacer(),
            self.scripts_at_end_of_body()
        )
    }

    /// `<head>` with `original_head`, followed by the standard body
    fn head_test(&self, original_head: &str, expected_mid_head: &str) {
        let original = format!("<head>{original_head}</head><body>hello, world!</body>");
        let expected = format!(
            "<html><head>{}{expected_mid_head}{}</head>{}</html>",
            self.head_and_viewport(),
            self.styles(),
            self.expected_body()
        );
        assert_eq!(self.rewrite_html(&original), expected);
    }

    /// Body content expected to come back unchanged between spacer and script
    fn body_unchanged(&self, body: &str) {
        let original = format!("<head></head><body>{body}</body>");
        let expected = format!(
            "<html><head>{}{}</head><body>{}{body}{}</body></html>",
            self.head_and_viewport(),
            self.styles(),
            spacer(),
            self.scripts_at_end_of_body()
        );
        assert_eq!(self.rewrite_html(&original), expected);
    }
}

fn spacer() -> &'static str {
    "<header id=\"psmob-header-bar\" class=\"psmob-hide\"></header><div id=\"psmob-spacer\"></div>"
}

fn scrim() -> &'static str {
    "<div id=\"ps-progress-scrim\" class=\"psProgressScrim\">\
     <a href=\"javascript:psRemoveProgressBar();\" id=\"ps-progress-remove\">\
     Remove Progress Bar (doesn't stop mobilization)</a><br>\
     <a href=\"javascript:psSetDebugMode();\" id=\"ps-progress-show-log\">\
     Show Debug Log In Progress Bar</a>\
     <div class=\"psProgressBar\">\
     <span id=\"ps-progress-span\" class=\"psProgressSpan\"></span></div>\
     <pre id=\"ps-progress-log\" class=\"psProgressLog\"></pre></div>"
}

fn div_with_role(tree: &mut DomTree, role: &str, text: &str) -> mob_dom::NodeId {
    let div = tree.create_element_with_attrs("div", &[(MOBILE_ROLE_ATTRIBUTE, role)]);
    let text = tree.create_text(text);
    tree.append_child(div, text).unwrap();
    div
}

// ============================================================================
// HEAD FIX-UP
// ============================================================================

#[test]
fn test_add_style_and_viewport() {
    let h = Harness::new(true);
    h.head_test("", "");
    h.check_counters(0, 0, 0, 0, 0, 0);
}

#[test]
fn test_add_style_and_viewport_no_layout() {
    let h = Harness::new(false);
    h.head_test("", "");
    h.check_counters(0, 0, 0, 0, 0, 0);
}

#[test]
fn test_remove_existing_viewport() {
    let h = Harness::new(true);
    h.head_test("<meta name='viewport' content='value' />", "");
    h.check_counters(0, 0, 0, 0, 0, 1);
}

#[test]
fn test_remove_existing_viewport_that_matches() {
    let h = Harness::new(true);
    h.head_test("<meta name='viewport' content='width=device-width'/>", "");
    h.check_counters(0, 0, 0, 0, 0, 1);
}

#[test]
fn test_remove_existing_viewport_without_layout() {
    let h = Harness::new(false);
    h.head_test("<meta name='viewport' content='width=100px;'/>", "");
    h.check_counters(0, 0, 0, 0, 0, 1);
}

#[test]
fn test_remove_every_viewport() {
    let h = Harness::new(true);
    h.head_test(
        "<meta name='viewport' content='a'><title>t</title><meta name='VIEWPORT' content='b'>",
        "<title>t</title>",
    );
    h.check_counters(0, 0, 0, 0, 0, 2);
}

#[test]
fn test_head_unmodified() {
    let h = Harness::new(true);
    h.head_test(
        "<meta name='keywords' content='cool,stuff'/><style>abcd</style>",
        "<meta name=\"keywords\" content=\"cool,stuff\"><style>abcd</style>",
    );
    h.check_counters(1, 0, 0, 0, 0, 0);
}

#[test]
fn test_head_links_unmodified() {
    let h = Harness::new(true);
    h.head_test(
        "<link rel='stylesheet' type='text/css' href='theme.css'>",
        "<link rel=\"stylesheet\" type=\"text/css\" href=\"theme.css\">",
    );
    h.check_counters(1, 0, 0, 0, 0, 0);
}

#[test]
fn test_hello_world_scenario() {
    let h = Harness::new(true);
    let out = h.rewrite_html("<head></head><body>hello, world!</body>");
    assert_eq!(
        out,
        format!(
            "<html><head><meta itemprop=\"telephone\" content=\"16175551212\">\
             <meta name=\"viewport\" content=\"width=device-width\">\
             <script src=\"/psajs/mobilize_xhr.0.js\"></script>\
             <link rel=\"stylesheet\" href=\"/psajs/mobilize_css.0.css\">\
             <link rel=\"stylesheet\" href=\"/psajs/mobilize_layout_css.0.css\"></head>\
             <body>{}hello, world!{}</body></html>",
            spacer(),
            h.scripts_at_end_of_body()
        )
    );
    h.check_counters(0, 0, 0, 0, 0, 0);
}

#[test]
fn test_multiple_heads() {
    let h = Harness::new(true);
    let mut tree = DomTree::new();
    let root = tree.root();
    for _ in 0..2 {
        let head = tree.create_element("head");
        tree.append_child(root, head).unwrap();
    }

    let expected = format!(
        "<head>{}{}</head><head></head>{}",
        h.head_and_viewport(),
        h.styles(),
        h.scripts_at_end_of_body()
    );
    assert_eq!(h.rewrite_tree(&mut tree), expected);
    h.check_counters(0, 0, 0, 0, 0, 0);
}

#[test]
fn test_single_insertion_for_many_heads() {
    for layout in [false, true] {
        let h = Harness::new(layout);
        let mut tree = DomTree::new();
        let root = tree.root();
        for _ in 0..4 {
            let head = tree.create_element("head");
            tree.append_child(root, head).unwrap();
        }
        h.rewrite_tree(&mut tree);

        let telephone = tree
            .elements_by_tag(root, "meta")
            .into_iter()
            .filter(|&id| tree.get_attr(id, "itemprop") == Some("telephone"))
            .count();
        let viewport = tree
            .elements_by_tag(root, "meta")
            .into_iter()
            .filter(|&id| tree.get_attr(id, "name") == Some("viewport"))
            .count();
        let module = tree
            .elements_by_tag(root, "script")
            .into_iter()
            .filter(|&id| tree.get_attr(id, "src") == Some("/psajs/mobilize_xhr.0.js"))
            .count();
        let expected = usize::from(layout);
        assert_eq!(telephone, 1);
        assert_eq!(viewport, expected);
        assert_eq!(module, expected);
    }
}

#[test]
fn test_telephone_meta_with_empty_phone_number() {
    let mut h = Harness::new(false);
    h.config.phone_number = String::new();
    let mut doc = parse("<head></head><body>x</body>");
    h.filter().rewrite_document(&mut doc).unwrap();

    let tree = doc.tree();
    let telephone: Vec<_> = tree
        .elements_by_tag(tree.root(), "meta")
        .into_iter()
        .filter(|&id| tree.get_attr(id, "itemprop") == Some("telephone"))
        .collect();
    assert_eq!(telephone.len(), 1);
    assert_eq!(tree.get_attr(telephone[0], "content"), Some(""));
    assert_eq!(doc.head().and_then(|head| tree.first_child(head)), Some(telephone[0]));
    assert!(serialize(&doc).contains("<head><meta itemprop=\"telephone\" content>"));
}

// ============================================================================
// BODY
// ============================================================================

#[test]
fn test_empty_body() {
    let h = Harness::new(true);
    let mut tree = DomTree::new();
    let body = tree.create_element("body");
    tree.append_child(tree.root(), body).unwrap();

    let expected = format!("<body>{}{}</body>", spacer(), h.scripts_at_end_of_body());
    assert_eq!(h.rewrite_tree(&mut tree), expected);
    h.check_counters(0, 0, 0, 0, 0, 0);
}

#[test]
fn test_empty_body_with_progress() {
    let mut h = Harness::new(true);
    h.progress_added = false;
    let mut tree = DomTree::new();
    let body = tree.create_element("body");
    tree.append_child(tree.root(), body).unwrap();

    let expected = format!(
        "<body>{}{}{}</body>",
        spacer(),
        scrim(),
        h.scripts_at_end_of_body()
    );
    assert_eq!(h.rewrite_tree(&mut tree), expected);
    h.check_counters(0, 0, 0, 0, 0, 0);
}

#[test]
fn test_no_progress_without_layout() {
    let h = Harness::new(false);
    let filter = MobilizeRewriteFilter::new(&h.config, &h.stats);
    let mut doc = parse("<body>x</body>");
    filter.rewrite_document(&mut doc).unwrap();
    assert!(!serialize(&doc).contains("ps-progress-scrim"));
}

#[test]
fn test_map_tags_unmodified() {
    let h = Harness::new(true);
    h.body_unchanged(
        "<map name=\"planetmap\"><area shape=\"rect\" coords=\"0,0,82,126\" alt=\"Sun\"></map>",
    );
    h.check_counters(1, 0, 0, 0, 0, 0);
}

#[test]
fn test_script_tags_unmodified() {
    let h = Harness::new(true);
    h.body_unchanged(
        "<script>document.getElementById('demo').innerHTML = 'Hello JavaScript!';</script>",
    );
    h.check_counters(1, 0, 0, 0, 0, 0);
}

#[test]
fn test_style_tags_unmodified() {
    let h = Harness::new(true);
    h.body_unchanged("<style>* { foo: bar; }</style>");
    h.check_counters(1, 0, 0, 0, 0, 0);
}

#[test]
fn test_unknown_mobile_role() {
    let h = Harness::new(true);
    h.body_unchanged("<div data-mobile-role=\"garbage\"><a>123</a></div>");
    h.check_counters(0, 0, 0, 0, 0, 0);
}

#[test]
fn test_header_within_body() {
    let h = Harness::new(true);
    h.body_unchanged(
        "<div data-mobile-role=\"content\">123<div data-mobile-role=\"header\">456</div>789</div>",
    );
    h.check_counters(0, 1, 0, 1, 0, 0);
}

#[test]
fn test_header_within_header() {
    let h = Harness::new(true);
    h.body_unchanged(
        "<div data-mobile-role=\"header\">123<div data-mobile-role=\"header\">456</div>789</div>",
    );
    h.check_counters(0, 2, 0, 0, 0, 0);
}

#[test]
fn test_every_role_counted() {
    let h = Harness::new(true);
    h.body_unchanged(
        "<nav data-mobile-role=\"navigational\">n</nav>\
         <div data-mobile-role=\"marginal\">m</div>\
         <div data-mobile-role=\"keeper\">k</div>",
    );
    h.check_counters(1, 0, 1, 0, 1, 0);
}

#[test]
fn test_viewport_in_body_is_deleted() {
    let h = Harness::new(false);
    let out = h.rewrite_html("<body><meta name=\"viewport\" content=\"x\"><p>a</p></body>");
    assert!(!out.contains("name=\"viewport\""), "{out}");
    assert!(out.contains("<p>a</p>"));
    h.check_counters(0, 0, 0, 0, 0, 1);
}

#[test]
fn test_viewport_inside_keeper_is_deleted() {
    let h = Harness::new(true);
    let mut tree = DomTree::new();
    let body = tree.create_element("body");
    tree.append_child(tree.root(), body).unwrap();
    let map = tree.create_element_with_attrs("map", &[("name", "m")]);
    tree.append_child(body, map).unwrap();
    let viewport = tree.create_element_with_attrs("meta", &[("name", "viewport")]);
    let area = tree.create_element("area");
    tree.append_child(map, viewport).unwrap();
    tree.append_child(map, area).unwrap();

    let out = h.rewrite_tree(&mut tree);
    assert!(tree.is_removed(viewport));
    assert!(out.contains("<map name=\"m\"><area></map>"), "{out}");
    h.check_counters(1, 0, 0, 0, 0, 1);
}

#[test]
fn test_multiple_bodys() {
    let h = Harness::new(true);
    let mut tree = DomTree::new();
    let root = tree.root();
    for _ in 0..2 {
        let body = tree.create_element("body");
        tree.append_child(root, body).unwrap();
    }

    let expected = format!(
        "<body>{}</body><body>{}</body>",
        spacer(),
        h.scripts_at_end_of_body()
    );
    assert_eq!(h.rewrite_tree(&mut tree), expected);
    h.check_counters(0, 0, 0, 0, 0, 0);
}

#[test]
fn test_multiple_bodys_with_content() {
    let h = Harness::new(true);
    let mut tree = DomTree::new();
    let root = tree.root();

    let first = tree.create_element("body");
    tree.append_child(root, first).unwrap();
    let text = tree.create_text("123");
    tree.append_child(first, text).unwrap();
    let marginal = div_with_role(&mut tree, "marginal", "567");
    tree.append_child(first, marginal).unwrap();

    let second = tree.create_element("body");
    tree.append_child(root, second).unwrap();
    let content = div_with_role(&mut tree, "content", "890");
    let header = div_with_role(&mut tree, "header", "abc");
    tree.append_child(second, content).unwrap();
    tree.append_child(second, header).unwrap();

    let expected = format!(
        "<body>{}123<div data-mobile-role=\"marginal\">567</div></body>\
         <body><div data-mobile-role=\"content\">890</div>\
         <div data-mobile-role=\"header\">abc</div>{}</body>",
        spacer(),
        h.scripts_at_end_of_body()
    );
    assert_eq!(h.rewrite_tree(&mut tree), expected);
    h.check_counters(0, 1, 0, 1, 1, 0);
}

#[test]
fn test_no_head_no_body() {
    let h = Harness::new(true);
    let mut tree = DomTree::new();
    let p = tree.create_element("p");
    tree.append_child(tree.root(), p).unwrap();

    let expected = format!("<p></p>{}", h.scripts_at_end_of_body());
    assert_eq!(h.rewrite_tree(&mut tree), expected);
    h.check_counters(0, 0, 0, 0, 0, 0);
}

#[test]
fn test_pages_mobilized_once_for_deep_documents() {
    let h = Harness::new(false);
    let mut html = String::from("<body>");
    for _ in 0..300 {
        html.push_str("<div data-mobile-role=\"content\">");
    }
    for _ in 0..300 {
        html.push_str("</div>");
    }
    html.push_str("</body>");

    h.rewrite_html(&html);
    assert_eq!(h.counter(MobilizeCounter::PagesMobilized), 1);
    assert_eq!(h.counter(MobilizeCounter::ContentBlocks), 300);
}

#[test]
fn test_statistics_accumulate_across_documents() {
    let h = Harness::new(true);
    h.rewrite_html("<body><style></style></body>");
    h.rewrite_html("<body><script></script></body>");
    assert_eq!(h.counter(MobilizeCounter::PagesMobilized), 2);
    assert_eq!(h.counter(MobilizeCounter::KeeperBlocks), 2);
}

// ============================================================================
// THEME AND SCRIPT
// ============================================================================

#[test]
fn test_configure_theme() {
    let mut h = Harness::new(false);
    h.config.set_theme("#ff0000 #0000ff").unwrap();
    let original = "<head></head><body>hello, world!</body>";
    let expected_body = format!(
        "<body>{}hello, world!{}</body>",
        spacer(),
        h.scripts_at_end_of_body_with("[255,0,0]", "[0,0,255]")
    );
    let expected = format!(
        "<html><head>{}{}</head>{expected_body}</html>",
        h.head_and_viewport(),
        h.styles()
    );
    assert_eq!(h.rewrite_html(original), expected);

    h.config.set_theme("#ff0000 #0000ff http://logo.com").unwrap();
    assert_eq!(h.rewrite_html(original), expected);
}

#[test]
fn test_precompute_theme() {
    let mut h = Harness::new(false);
    h.config.precompute_theme = true;
    let expected = format!(
        "<html><head>{}{}</head>{}</html>",
        h.head_and_viewport(),
        h.styles(),
        h.expected_body()
    );
    assert_eq!(h.rewrite_html("<head></head><body>hello, world!</body>"), expected);
}

#[test]
fn test_beacon_category() {
    let mut h = Harness::new(false);
    h.config.beacon_category = Some("'experiment2'".into());
    let out = h.rewrite_html("<head>");
    assert!(
        out.contains(";window.psMobBeaconCategory='\\'experiment2\\'';"),
        "{out}"
    );
}

#[test]
fn test_hostile_config_values_stay_inside_script() {
    let mut h = Harness::new(false);
    h.config.conversion_label = "</script><script>alert(1)</script>".into();
    h.config.beacon_category = Some("a\nb".into());
    let out = h.rewrite_html("<body></body>");
    assert_eq!(out.matches("</script>").count(), 2, "{out}");
    assert!(out.contains("window.psMobBeaconCategory='a\\nb';"));
}
