//! # Label Templates
//!
//! Serde types for the records the template store hands to the renderer:
//! a template with its base image and elements, and the per-render
//! [`DynamicFieldContext`].
//!
//! ## JSON Shape
//!
//! ```json
//! {
//!   "id": 12,
//!   "base_image": "images/12_REG-1_S7.png",
//!   "quantity": 500,
//!   "created_at_ms": 1700000000000,
//!   "fields": { "register_no": "REG-1", "sticker_no": "S7", "lot_no": "L-44" },
//!   "elements": [
//!     { "kind": "qr_code", "x": 20, "y": 20, "size": 120 },
//!     { "kind": "register_no", "label": "REG", "x": 160, "y": 24, "size": 18, "bold": true },
//!     { "kind": 3, "label": "LOT", "x": 160, "y": 50 }
//!   ]
//! }
//! ```
//!
//! `kind` accepts a snake_case name or the legacy numeric element id.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::LabelError;
use crate::qr::payload::{self, QrPayload};

/// The role of an element on a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "RawElementKind")]
pub enum ElementKind {
    /// QR code pointing at the label's lookup URL
    QrCode,
    /// Register number, composed with the sticker number when available
    RegisterNo,
    /// Lot number
    LotNo,
    /// Production date
    ProductionDate,
    /// Expiry date
    ExpiryDate,
    /// Literal text from the element's label
    Text,
}

impl ElementKind {
    /// Map a legacy numeric element id.
    ///
    /// Ids without a dedicated role render as literal text.
    pub fn from_legacy_id(id: i64) -> Self {
        match id {
            1 => ElementKind::QrCode,
            2 => ElementKind::RegisterNo,
            3 => ElementKind::LotNo,
            4 => ElementKind::ProductionDate,
            5 => ElementKind::ExpiryDate,
            _ => ElementKind::Text,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementKind::QrCode => "qr_code",
            ElementKind::RegisterNo => "register_no",
            ElementKind::LotNo => "lot_no",
            ElementKind::ProductionDate => "production_date",
            ElementKind::ExpiryDate => "expiry_date",
            ElementKind::Text => "text",
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawElementKind {
    Id(i64),
    Name(String),
}

impl TryFrom<RawElementKind> for ElementKind {
    type Error = String;

    fn try_from(raw: RawElementKind) -> Result<Self, Self::Error> {
        match raw {
            RawElementKind::Id(id) => Ok(ElementKind::from_legacy_id(id)),
            RawElementKind::Name(name) => match name.as_str() {
                "qr_code" => Ok(ElementKind::QrCode),
                "register_no" => Ok(ElementKind::RegisterNo),
                "lot_no" => Ok(ElementKind::LotNo),
                "production_date" => Ok(ElementKind::ProductionDate),
                "expiry_date" => Ok(ElementKind::ExpiryDate),
                "text" => Ok(ElementKind::Text),
                other => other
                    .parse::<i64>()
                    .map(ElementKind::from_legacy_id)
                    .map_err(|_| format!("unknown element kind: {:?}", other)),
            },
        }
    }
}

fn default_size() -> f32 {
    16.0
}

fn default_color() -> String {
    "#000000".to_string()
}

/// One renderable item on a label.
///
/// `size` is the font pixel size for text and the edge length in pixels for
/// QR codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelElement {
    #[serde(alias = "element_id", alias = "elementId")]
    pub kind: ElementKind,
    /// Fallback text when no dynamic value applies
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default = "default_size")]
    pub size: f32,
    #[serde(default)]
    pub bold: bool,
    /// Hex color (`#RGB`, `#RRGGBB` or `#RRGGBBAA`)
    #[serde(default = "default_color")]
    pub color: String,
}

impl LabelElement {
    pub fn new(kind: ElementKind, label: &str, x: f32, y: f32) -> Self {
        Self {
            kind,
            label: label.to_string(),
            x,
            y,
            size: default_size(),
            bold: false,
            color: default_color(),
        }
    }

    /// Literal text element.
    pub fn text(label: &str, x: f32, y: f32) -> Self {
        Self::new(ElementKind::Text, label, x, y)
    }

    /// QR code element with the given edge length.
    pub fn qr(x: f32, y: f32, size: f32) -> Self {
        Self::new(ElementKind::QrCode, "", x, y).size(size)
    }

    pub fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn color(mut self, color: &str) -> Self {
        self.color = color.to_string();
        self
    }

    /// Check position and size invariants.
    ///
    /// Positions beyond the base image are allowed; they are clipped at render time.
    pub fn validate(&self) -> Result<(), LabelError> {
        if !(self.x.is_finite() && self.y.is_finite()) || self.x < 0.0 || self.y < 0.0 {
            return Err(LabelError::InvalidTemplate(format!(
                "{} element has negative or non-finite position ({}, {})",
                self.kind.name(),
                self.x,
                self.y
            )));
        }
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(LabelError::InvalidTemplate(format!(
                "{} element has non-positive size {}",
                self.kind.name(),
                self.size
            )));
        }
        Ok(())
    }
}

/// Substitution values for one render pass.
///
/// Empty strings are treated the same as missing values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicFieldContext {
    #[serde(default)]
    pub register_no: Option<String>,
    #[serde(default)]
    pub lot_no: Option<String>,
    #[serde(default)]
    pub production_date: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub sticker_no: Option<String>,
    /// Precomputed QR payload (see [`crate::qr::payload`])
    #[serde(default, alias = "qr_data")]
    pub qr_payload: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl DynamicFieldContext {
    pub fn register_no(&self) -> Option<&str> {
        non_empty(&self.register_no)
    }

    pub fn lot_no(&self) -> Option<&str> {
        non_empty(&self.lot_no)
    }

    pub fn production_date(&self) -> Option<&str> {
        non_empty(&self.production_date)
    }

    pub fn expiry_date(&self) -> Option<&str> {
        non_empty(&self.expiry_date)
    }

    pub fn sticker_no(&self) -> Option<&str> {
        non_empty(&self.sticker_no)
    }

    pub fn qr_payload(&self) -> Option<&str> {
        non_empty(&self.qr_payload)
    }

    pub fn with_qr_payload(mut self, payload: impl Into<String>) -> Self {
        self.qr_payload = Some(payload.into());
        self
    }

    /// Layer `self` over `base`: non-empty values in `self` win.
    pub fn merged_over(&self, base: &DynamicFieldContext) -> DynamicFieldContext {
        fn pick(over: &Option<String>, base: &Option<String>) -> Option<String> {
            non_empty(over)
                .or_else(|| non_empty(base))
                .map(str::to_string)
        }

        DynamicFieldContext {
            register_no: pick(&self.register_no, &base.register_no),
            lot_no: pick(&self.lot_no, &base.lot_no),
            production_date: pick(&self.production_date, &base.production_date),
            expiry_date: pick(&self.expiry_date, &base.expiry_date),
            sticker_no: pick(&self.sticker_no, &base.sticker_no),
            qr_payload: pick(&self.qr_payload, &base.qr_payload),
        }
    }
}

/// A stored label template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelTemplate {
    pub id: u64,
    /// Base image path; relative paths are resolved by the caller
    pub base_image: PathBuf,
    /// Number of labels in the approved run
    #[serde(default)]
    pub quantity: u32,
    /// Creation time in epoch milliseconds, shared by every QR identity of the run
    #[serde(default)]
    pub created_at_ms: i64,
    /// The template's own field values, used for previews
    #[serde(default)]
    pub fields: DynamicFieldContext,
    #[serde(default)]
    pub elements: Vec<LabelElement>,
}

impl LabelTemplate {
    pub fn from_json(json: &str) -> Result<Self, LabelError> {
        serde_json::from_str(json).map_err(|e| LabelError::InvalidTemplate(e.to_string()))
    }

    /// Read a template from a JSON file.
    ///
    /// A relative `base_image` is resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self, LabelError> {
        let json = std::fs::read_to_string(path)?;
        let mut template = Self::from_json(&json)?;
        if let Some(dir) = path.parent() {
            template.resolve_base_image(dir);
        }
        Ok(template)
    }

    /// Make a relative `base_image` relative to `root`.
    pub fn resolve_base_image(&mut self, root: &Path) {
        if self.base_image.is_relative() {
            self.base_image = root.join(&self.base_image);
        }
    }

    pub fn validate(&self) -> Result<(), LabelError> {
        self.elements.iter().try_for_each(LabelElement::validate)
    }

    /// QR identity of the label with the given sequence number.
    pub fn qr_payload(&self, sequence_no: u32) -> QrPayload {
        QrPayload::new(self.id, sequence_no, self.created_at_ms)
    }

    /// QR identities for the whole run (`1..=quantity`).
    pub fn qr_run(&self) -> Vec<QrPayload> {
        payload::batch(self.id, self.quantity, self.created_at_ms)
    }

    /// Field values for one label of the run.
    ///
    /// Non-empty `overrides` win over the template's own fields. Without an
    /// explicit payload the QR identity for `sequence_no` is filled in.
    pub fn context_for(
        &self,
        sequence_no: u32,
        overrides: &DynamicFieldContext,
    ) -> DynamicFieldContext {
        let ctx = overrides.merged_over(&self.fields);
        if ctx.qr_payload().is_some() {
            ctx
        } else {
            ctx.with_qr_payload(self.qr_payload(sequence_no).encode())
        }
    }

    /// Field values for a preview: the template's own fields and sequence number 1.
    pub fn preview_context(&self) -> DynamicFieldContext {
        self.context_for(1, &DynamicFieldContext::default())
    }
}
