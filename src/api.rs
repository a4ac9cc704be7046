//! Handling color and font requests.
//!
//! This is the layer an HTTP server or a command line tool sits on. Requests
//! are plain deserializable structs, responses are a status code together
//! with a JSON body, either the artifact or an `{msg, id}` error.

use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::color::{Background, Color};
use crate::configure::Settings;
use crate::document::{VectorDocument, VectorDocumentComposer};
use crate::error::{ErrorFormatter, FontpressError, FontpressResult};
use crate::font::{Fetch, FontResolver, FontSource, LoadedFont, WeightQuery};
use crate::render::{apply_alpha_matte, render, OutputFormat, RenderSettings};
use crate::text::TextLayoutEngine;

/// A request for a document filled with a single color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorRequest {
    /// `pdf` or `png`, case-insensitive.
    pub filetype: String,
    /// The width of the document.
    pub width: u32,
    /// The height of the document.
    pub height: u32,
    /// The fill color.
    pub color: String,
}

/// A request for a line of text in a downloaded font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontRequest {
    /// `pdf` or `png`, case-insensitive.
    pub filetype: String,
    /// A font family name or a URL to a font file or archive.
    pub fontname: String,
    /// The text to draw.
    pub text: String,
    /// The text color.
    #[serde(default = "default_color")]
    pub color: String,
    /// The background color, or `none`.
    #[serde(default = "default_bg_color")]
    pub bg_color: String,
    /// A weight to pick from archives, matched against file names.
    #[serde(default)]
    pub weight: Option<String>,
    /// The resolution of PNG output.
    #[serde(default)]
    pub dpi: Option<u32>,
}

fn default_color() -> String {
    "black".to_string()
}

fn default_bg_color() -> String {
    "white".to_string()
}

/// The outcome of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// The HTTP status code.
    pub status: u16,
    /// The JSON body.
    pub body: Value,
    /// How long handling the request took.
    pub process_time: Duration,
}

/// A rendered color document.
#[derive(Debug, Clone)]
pub struct ColorArtifact {
    /// The document that was rendered.
    pub document: VectorDocument,
    /// The rendered file.
    pub bytes: Vec<u8>,
    /// The requested color.
    pub color: String,
    /// The requested width and height.
    pub size: (u32, u32),
}

impl ColorArtifact {
    /// The JSON body of a successful response.
    pub fn to_json(&self, elapsed: Duration) -> Value {
        json!({
            "color": self.color,
            "size": format!("{}x{}", self.size.0, self.size.1),
            "filesize": self.bytes.len(),
            "base64": STANDARD.encode(&self.bytes),
            "time": elapsed.as_secs_f64(),
        })
    }
}

/// A rendered line of text.
#[derive(Debug, Clone)]
pub struct FontArtifact {
    /// The document that was rendered.
    pub document: VectorDocument,
    /// The rendered file.
    pub bytes: Vec<u8>,
    /// The font, together with where it came from.
    pub font: LoadedFont,
    /// The requested weight.
    pub weight: Option<String>,
    /// The requested text color.
    pub color: String,
}

impl FontArtifact {
    /// The JSON body of a successful response.
    pub fn to_json(&self, elapsed: Duration) -> Value {
        let mut body = json!({
            "font_url": self.font.url,
            "weight": self.weight,
            "base64": STANDARD.encode(&self.bytes),
            "color": self.color,
            "filesize": self.bytes.len(),
            "dl_time": self.font.download_time.as_secs_f64(),
            "time": elapsed.as_secs_f64(),
        });

        if let Some(candidates) = &self.font.candidates {
            body["weight_list"] = json!(candidates);
        }

        if let Some(selected) = &self.font.selected {
            body["selected_weight"] = json!(selected);
        }

        body
    }
}

/// Handles requests with one set of settings.
pub struct Api<F> {
    settings: Settings,
    resolver: FontResolver<F>,
    composer: VectorDocumentComposer,
    errors: ErrorFormatter,
}

impl<F: Fetch> Api<F> {
    /// Create a new handler.
    ///
    /// Fails if the configured PDF background isn't a valid color.
    pub fn new(fetcher: F, settings: Settings) -> FontpressResult<Self> {
        Ok(Self {
            resolver: FontResolver::new(fetcher, &settings),
            composer: VectorDocumentComposer::from_settings(&settings)?,
            errors: settings.error_formatter(),
            settings,
        })
    }

    /// Handle a color request.
    pub fn color(&self, request: &ColorRequest) -> ApiResponse {
        let start = Instant::now();
        let result = self.render_color(request);
        self.respond(result.map(|a| a.to_json(start.elapsed())), start)
    }

    /// Handle a font request.
    pub fn font(&self, request: &FontRequest) -> ApiResponse {
        let start = Instant::now();
        let result = self.render_font(request);
        self.respond(result.map(|a| a.to_json(start.elapsed())), start)
    }

    /// Render the document of a color request.
    pub fn render_color(&self, request: &ColorRequest) -> FontpressResult<ColorArtifact> {
        let format = request.filetype.parse::<OutputFormat>()?;
        let color = request.color.parse::<Color>()?;

        let document =
            self.composer
                .compose_color(request.width as f32, request.height as f32, color);
        let bytes = render(&document, format, &RenderSettings::new(&self.settings, None))?;

        Ok(ColorArtifact {
            document,
            bytes,
            color: request.color.clone(),
            size: (request.width, request.height),
        })
    }

    /// Render the document of a font request.
    pub fn render_font(&self, request: &FontRequest) -> FontpressResult<FontArtifact> {
        let format = request.filetype.parse::<OutputFormat>()?;
        let source = FontSource::parse(&request.fontname)?;
        let color = request.color.parse::<Color>()?;
        let background = request.bg_color.parse::<Background>()?;
        let weight = request.weight.as_deref().and_then(WeightQuery::new);

        let font = self.resolver.load(&source, weight.as_ref())?;

        let layout = TextLayoutEngine::new(self.settings.font_size, &self.settings).layout(
            &request.text,
            &font.font,
            color,
        );
        let document = self.composer.compose(&layout, background, format);

        let render_settings = RenderSettings::new(&self.settings, request.dpi);
        let mut bytes = render(&document, format, &render_settings)?;

        if format == OutputFormat::Png && background == Background::None {
            bytes = apply_alpha_matte(&bytes, self.settings.alpha_threshold)?;
        }

        Ok(FontArtifact {
            document,
            bytes,
            font,
            weight: request.weight.clone(),
            color: request.color.clone(),
        })
    }

    /// The response for a failed request.
    pub fn error(&self, error: &FontpressError) -> Value {
        self.errors.body(error)
    }

    fn respond(&self, result: FontpressResult<Value>, start: Instant) -> ApiResponse {
        match result {
            Ok(body) => {
                let process_time = start.elapsed();
                info!("request handled in {:.3}s", process_time.as_secs_f64());

                ApiResponse {
                    status: 200,
                    body,
                    process_time,
                }
            }
            Err(error) => {
                if error.is_user_error() {
                    info!("request rejected: {error}");
                } else {
                    warn!("request failed: {error}");
                }

                ApiResponse {
                    status: error.status(),
                    body: self.error(&error),
                    process_time: start.elapsed(),
                }
            }
        }
    }
}
