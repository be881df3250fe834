//! Built-in node and mark extensions.
//!
//! These mirror the editor's starter kit so stored documents render the
//! same way on the server as in the authoring surface.

use super::{Extension, HtmlContext, Options, HTML_ATTRIBUTES};
use serde_json::{json, Value};
use std::sync::OnceLock;

/// Clone a built-in from its process-wide definition, so every call shares
/// one renderer and equal lists hit the registry cache.
fn shared(slot: &'static OnceLock<Extension>, build: fn() -> Extension) -> Extension {
    slot.get_or_init(build).clone()
}

fn attrs(ctx: HtmlContext<'_>) -> Value {
    Value::Object(ctx.html_attributes)
}

fn with_html_attributes(ext: Extension) -> Extension {
    ext.with_option(HTML_ATTRIBUTES, json!({}))
}

/// Root document node. Rendered by each output target directly.
pub fn document() -> Extension {
    Extension::node("doc")
}

/// Text node. Rendered by each output target directly.
pub fn text() -> Extension {
    Extension::node("text")
}

/// `<p>` paragraph.
pub fn paragraph() -> Extension {
    static EXT: OnceLock<Extension> = OnceLock::new();
    shared(&EXT, || {
        with_html_attributes(Extension::node("paragraph"))
            .with_priority(1000)
            .with_render_html(|ctx| json!(["p", attrs(ctx), 0]))
    })
}

/// `<h1>`..`<h6>` heading, level taken from the `level` attribute.
pub fn heading() -> Extension {
    static EXT: OnceLock<Extension> = OnceLock::new();
    shared(&EXT, || {
        with_html_attributes(Extension::node("heading"))
            .with_option("levels", json!([1, 2, 3, 4, 5, 6]))
            .with_render_html(|ctx| {
                let levels: Vec<u64> = ctx
                    .options
                    .get("levels")
                    .and_then(Value::as_array)
                    .map(|l| l.iter().filter_map(Value::as_u64).collect())
                    .unwrap_or_default();
                let requested = ctx.target.attr("level").and_then(Value::as_u64);
                let level = match requested {
                    Some(l) if levels.contains(&l) => l,
                    _ => levels.first().copied().unwrap_or(1),
                };
                json!([format!("h{}", level), attrs(ctx), 0])
            })
    })
}

/// `<blockquote>` block.
pub fn blockquote() -> Extension {
    static EXT: OnceLock<Extension> = OnceLock::new();
    shared(&EXT, || {
        with_html_attributes(Extension::node("blockquote"))
            .with_render_html(|ctx| json!(["blockquote", attrs(ctx), 0]))
    })
}

/// `<ul>` list.
pub fn bullet_list() -> Extension {
    static EXT: OnceLock<Extension> = OnceLock::new();
    shared(&EXT, || {
        with_html_attributes(Extension::node("bulletList"))
            .with_option("itemTypeName", "listItem")
            .with_render_html(|ctx| json!(["ul", attrs(ctx), 0]))
    })
}

/// `<ol>` list; a `start` other than 1 is rendered.
pub fn ordered_list() -> Extension {
    static EXT: OnceLock<Extension> = OnceLock::new();
    shared(&EXT, || {
        with_html_attributes(Extension::node("orderedList"))
            .with_option("itemTypeName", "listItem")
            .with_attributes(["start"])
            .with_render_html(|ctx| {
                let mut html = ctx.html_attributes;
                if html.get("start").and_then(Value::as_i64) == Some(1) {
                    html.remove("start");
                }
                json!(["ol", Value::Object(html), 0])
            })
    })
}

/// `<li>` list item.
pub fn list_item() -> Extension {
    static EXT: OnceLock<Extension> = OnceLock::new();
    shared(&EXT, || {
        with_html_attributes(Extension::node("listItem"))
            .with_render_html(|ctx| json!(["li", attrs(ctx), 0]))
    })
}

/// `<pre><code>` block with an optional `language-*` class.
pub fn code_block() -> Extension {
    static EXT: OnceLock<Extension> = OnceLock::new();
    shared(&EXT, || {
        with_html_attributes(Extension::node("codeBlock"))
            .with_option("languageClassPrefix", "language-")
            .with_render_html(|ctx| {
                let class = match ctx.target.attr("language").and_then(Value::as_str) {
                    Some(lang) if !lang.is_empty() => {
                        let prefix = ctx
                            .options
                            .get("languageClassPrefix")
                            .and_then(Value::as_str)
                            .unwrap_or("language-");
                        Value::String(format!("{}{}", prefix, lang))
                    }
                    _ => Value::Null,
                };
                json!(["pre", attrs(ctx), ["code", {"class": class}, 0]])
            })
    })
}

/// `<br>` line break.
pub fn hard_break() -> Extension {
    static EXT: OnceLock<Extension> = OnceLock::new();
    shared(&EXT, || {
        with_html_attributes(Extension::node("hardBreak"))
            .with_option("keepMarks", true)
            .with_render_html(|ctx| json!(["br", attrs(ctx)]))
    })
}

/// `<hr>` rule.
pub fn horizontal_rule() -> Extension {
    static EXT: OnceLock<Extension> = OnceLock::new();
    shared(&EXT, || {
        with_html_attributes(Extension::node("horizontalRule"))
            .with_render_html(|ctx| json!(["hr", attrs(ctx)]))
    })
}

/// `<img>` with `src`, `alt` and `title` attributes.
pub fn image() -> Extension {
    static EXT: OnceLock<Extension> = OnceLock::new();
    shared(&EXT, || {
        with_html_attributes(Extension::node("image"))
            .with_option("inline", false)
            .with_option("allowBase64", false)
            .with_attributes(["src", "alt", "title", "width", "height"])
            .with_render_html(|ctx| {
                let mut html = ctx.html_attributes;
                let allow_base64 = ctx
                    .options
                    .get("allowBase64")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                let is_base64 = html
                    .get("src")
                    .and_then(Value::as_str)
                    .is_some_and(|src| src.starts_with("data:"));
                if is_base64 && !allow_base64 {
                    html.remove("src");
                }
                json!(["img", Value::Object(html)])
            })
    })
}

/// `<strong>` mark.
pub fn bold() -> Extension {
    static EXT: OnceLock<Extension> = OnceLock::new();
    shared(&EXT, || {
        with_html_attributes(Extension::mark("bold"))
            .with_render_html(|ctx| json!(["strong", attrs(ctx), 0]))
    })
}

/// `<em>` mark.
pub fn italic() -> Extension {
    static EXT: OnceLock<Extension> = OnceLock::new();
    shared(&EXT, || {
        with_html_attributes(Extension::mark("italic"))
            .with_render_html(|ctx| json!(["em", attrs(ctx), 0]))
    })
}

/// `<s>` mark.
pub fn strike() -> Extension {
    static EXT: OnceLock<Extension> = OnceLock::new();
    shared(&EXT, || {
        with_html_attributes(Extension::mark("strike"))
            .with_render_html(|ctx| json!(["s", attrs(ctx), 0]))
    })
}

/// Inline `<code>` mark.
pub fn code() -> Extension {
    static EXT: OnceLock<Extension> = OnceLock::new();
    shared(&EXT, || {
        with_html_attributes(Extension::mark("code"))
            .with_render_html(|ctx| json!(["code", attrs(ctx), 0]))
    })
}

/// The editor's starter kit bundle.
pub fn starter_kit() -> Extension {
    Extension::bundle(
        "starterKit",
        vec![
            document(),
            paragraph(),
            text(),
            heading(),
            blockquote(),
            bullet_list(),
            ordered_list(),
            list_item(),
            code_block(),
            hard_break(),
            horizontal_rule(),
            bold(),
            italic(),
            strike(),
            code(),
        ],
    )
}

fn overrides(value: Value) -> Options {
    match value {
        Value::Object(map) => map,
        _ => Options::new(),
    }
}

/// Horizontal rule styled for review pages.
pub fn review_horizontal_rule() -> Extension {
    horizontal_rule().extend(overrides(json!({
        "HTMLAttributes": {"class": "tiptap-horizontal-rule"},
        "nextNodeType": "paragraph",
    })))
}

/// Block image styled for review pages.
pub fn review_image() -> Extension {
    image().extend(overrides(json!({
        "inline": false,
        "allowBase64": false,
        "resize": false,
        "HTMLAttributes": {"class": "tiptap-image"},
    })))
}

/// Extensions declared by the review editor and viewer.
///
/// The overrides follow the starter kit and re-declare some of its names;
/// resolution reports them as duplicates and the overrides win.
pub fn review_extensions() -> Vec<Extension> {
    vec![
        starter_kit(),
        review_horizontal_rule(),
        review_image(),
        list_item(),
        ordered_list(),
        bullet_list(),
        strike(),
    ]
}
