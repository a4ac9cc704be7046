/*!
Render a line of text in a downloaded font, or a plain color, to SVG, PDF and PNG.

fontpress takes care of the annoying parts of working with fonts found on the web:
a font name or URL is turned into a download, archives with many font files are
searched for the right one, and the text is converted into glyph outlines which
are placed next to each other. The result is a [`VectorDocument`] that is
rendered with [pdf-writer] or [resvg].

The [`api`] module ties all of this together with request and response types
that can be put behind an HTTP server or a command line tool.

# Example

```no_run
# use fontpress::api::{Api, FontRequest};
# use fontpress::configure::Settings;
# use fontpress::font::HttpFetcher;
# fn main() {
let settings = Settings::default();
let fetcher = HttpFetcher::new(&settings.fetch);
let api = Api::new(fetcher, settings).unwrap();

let response = api.font(&FontRequest {
    filetype: "png".to_string(),
    fontname: "Noto Sans".to_string(),
    text: "Hello!".to_string(),
    color: "black".to_string(),
    bg_color: "none".to_string(),
    weight: Some("Bold".to_string()),
    dpi: Some(144),
});

println!("{}", response.body);
# }
```

[pdf-writer]: https://github.com/typst/pdf-writer
[resvg]: https://github.com/linebender/resvg
*/

#![deny(missing_docs)]
#![forbid(unsafe_code)]

mod data;

pub mod api;
pub mod color;
pub mod configure;
pub mod document;
pub mod error;
pub mod font;
pub mod render;
pub mod text;

#[cfg(test)]
mod tests;

pub use data::Data;
pub use document::{VectorDocument, VectorDocumentComposer};
pub use error::{FontpressError, FontpressResult};
