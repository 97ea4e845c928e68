//! Word lists shared by the rule sets and the completion list.

/// HTML tag names. Also the completion vocabulary for every language.
pub(crate) const HTML_TAGS: &[&str] = &[
    "a", "address", "app", "applet", "area", "b", "base", "basefont", "bgsound", "big",
    "blink", "blockquote", "body", "br", "button", "caption", "center", "cite", "code",
    "col", "colgroup", "comment", "dd", "dfn", "dir", "div", "dl", "dt", "em", "embed",
    "fieldset", "font", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "hr", "html", "htmlplus", "hype", "i", "iframe", "img", "input",
    "ins", "del", "isindex", "kbd", "label", "legend", "li", "link", "listing", "map",
    "marquee", "menu", "meta", "multicol", "nobr", "noembed", "noframes", "noscript",
    "ol", "option", "p", "param", "plaintext", "pre", "s", "samp", "script", "select",
    "small", "sound", "spacer", "span", "strike", "strong", "style", "sub", "sup",
    "table", "tbody", "td", "textarea", "tfoot", "th", "thead", "title", "tr", "tt",
    "u", "var", "wbr", "xmp", "import",
];

/// HTML attribute names.
pub(crate) const HTML_ATTRIBUTES: &[&str] = &[
    "charset", "lang", "href", "onclick", "onmouseover", "onmouseout", "code",
    "codebase", "width", "height", "align", "vspace", "hspace", "name", "archive",
    "mayscript", "alt", "shape", "coords", "target", "nohref", "size", "color", "face",
    "src", "loop", "bgcolor", "background", "text", "vlink", "alink", "bgproperties",
    "topmargin", "leftmargin", "marginheight", "marginwidth", "onload", "onunload",
    "onfocus", "onblur", "stylesrc", "scroll", "clear", "type", "value", "valign",
    "span", "compact", "pluginspage", "pluginurl", "hidden", "autostart", "playcount",
    "volume", "controller", "mastersound", "starttime", "endtime", "point-size",
    "weight", "action", "method", "enctype", "onsubmit", "onreset", "scrolling",
    "noresize", "frameborder", "bordercolor", "cols", "rows", "framespacing", "border",
    "noshade", "longdesc", "ismap", "usemap", "lowsrc", "naturalsizeflag", "nosave",
    "dynsrc", "controls", "start", "suppress", "maxlength", "checked", "language",
    "onchange", "onkeypress", "onkeyup", "onkeydown", "autocomplete", "prompt", "for",
    "rel", "rev", "media", "direction", "behaviour", "scrolldelay", "scrollamount",
    "http-equiv", "content", "gutter", "defer", "event", "multiple", "readonly",
    "cellpadding", "cellspacing", "rules", "bordercolorlight", "bordercolordark",
    "summary", "colspan", "rowspan", "nowrap", "halign", "disabled", "accesskey",
    "tabindex", "id", "class",
];

/// CSS property names, in alternation order.
pub(crate) const CSS_PROPERTIES: &[&str] = &[
    "azimuth", "background-attachment", "background-color", "background-image",
    "background-position", "background-repeat", "background", "border-collapse",
    "border-color", "border-spacing", "border-style", "border-top", "border-right",
    "border-bottom", "border-left", "border-top-color", "border-right-color",
    "border-left-color", "border-bottom-color", "border-top-style",
    "border-right-style", "border-bottom-style", "border-left-style",
    "border-top-width", "border-right-width", "border-bottom-width",
    "border-left-width", "border-width", "border", "bottom", "caption-side", "clear",
    "clip", "color", "content", "counter-increment", "counter-reset", "cue-after",
    "cue-before", "cue", "cursor", "direction", "display", "elevation", "empty-cells",
    "float", "font-family", "font-size", "font-style", "font-variant", "font-weight",
    "font", "height", "left", "letter-spacing", "line-height", "list-style-image",
    "list-style-position", "list-style-type", "list-style", "margin-left",
    "margin-right", "margin-top", "margin-bottom", "margin", "max-height", "max-width",
    "min-height", "min-width", "orphans", "outline-color", "outline-style",
    "outline-width", "outline", "overflow", "padding-top", "padding-right",
    "padding-bottom", "padding-left", "padding", "page-break-after",
    "page-break-before", "page-break-inside", "pause-after", "pause-before", "pause",
    "pitch-range", "pitch", "play-during", "position", "quotes", "richness", "right",
    "speak-header", "speak-numeral", "speak-punctuation", "speak", "speech-rate",
    "stress", "table-layout", "text-align", "text-decoration", "text-indent",
    "text-transform", "top", "unicode-bidi", "vertical-align", "visibility",
    "voice-family", "volume", "white-space", "widows", "width", "word-spacing",
    "z-index",
];

/// JavaScript declaration and type words.
pub(crate) const JS_DATATYPES: &[&str] = &[
    "abstract", "arguments", "boolean", "byte", "char", "class", "const", "double",
    "enum", "final", "float", "function", "int", "interface", "long", "native",
    "package", "private", "protected", "public", "short", "static", "synchronized",
    "transient", "var", "void", "volatile",
];

/// The HTML tag vocabulary, in declaration order.
pub fn html_tags() -> &'static [&'static str] {
    HTML_TAGS
}

/// Builds a `\b(w1|w2|...)\b` alternation from a word list.
pub(crate) fn word_pattern(words: &[&str]) -> String {
    format!(r"\b({})\b", words.join("|"))
}
