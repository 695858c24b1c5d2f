pub const INDEX_HTML: &str = include_str!("../../web/index.html");
