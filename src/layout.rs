//! Horizontal layout of the report table.
//!
//! Column widths and x-offsets are derived once per render call from a small
//! weight table sized for the known consumption schema.  When the incoming
//! table does not match that schema the planner falls back to an equal split
//! so arbitrary column counts still render.  All arithmetic happens in
//! millimetres as plain `f64`; the PDF elements convert to `genpdf::Mm` at
//! the drawing boundary.

/// Suffix appended to truncated cell text.
pub const ELLIPSIS: &str = "…";

/// Relative width weights keyed by column name.
///
/// Weights are unit-free ratios; the original layout expressed them in
/// centimetres, which [`ColumnWeights::consumption`] preserves.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnWeights {
    entries: Vec<(String, f64)>,
}

impl ColumnWeights {
    /// Creates a weight table from `(column name, weight)` pairs.
    pub fn new(entries: impl Into<Vec<(String, f64)>>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    /// Weight table for the fixed nine-column consumption schema.
    pub fn consumption() -> Self {
        let entries = [
            ("ID Entrega", 1.5),
            ("ID Recibe", 1.5),
            ("Orden", 2.0),
            ("Tipo", 1.5),
            ("Item", 1.5),
            ("Cantidad", 1.5),
            ("Unidad", 1.0),
            ("Observación", 3.0),
            ("Fecha", 1.5),
        ];
        Self::new(
            entries
                .iter()
                .map(|(name, weight)| ((*name).to_owned(), *weight))
                .collect::<Vec<_>>(),
        )
    }

    /// Number of columns the weight table covers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the table holds no weights.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up the weight configured for `name`.
    pub fn weight_for(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, weight)| *weight)
    }
}

/// Column widths and x-offsets for one render call, in millimetres.
///
/// Offsets are measured from the left edge of the content area (after
/// margins); `offsets[i] + widths[i]` never exceeds the usable width.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnLayout {
    widths: Vec<f64>,
    offsets: Vec<f64>,
}

impl ColumnLayout {
    /// Partitions `usable_width` millimetres across `columns`.
    ///
    /// When every column name appears in `weights` and the counts match, the
    /// configured ratios are used at centimetre scale and rescaled
    /// proportionally if their total exceeds the usable width.  Any mismatch
    /// degrades to an equal split instead of failing.
    pub fn plan(columns: &[String], weights: &ColumnWeights, usable_width: f64) -> Self {
        let configured: Option<Vec<f64>> = if columns.len() == weights.len() {
            columns
                .iter()
                .map(|name| weights.weight_for(name))
                .collect()
        } else {
            None
        };

        let widths = match configured {
            Some(ratios) => {
                // The ratio table is expressed in centimetres.
                let mut widths: Vec<f64> = ratios.iter().map(|ratio| ratio * 10.0).collect();
                let total: f64 = widths.iter().sum();
                if total > usable_width && total > 0.0 {
                    let scale = usable_width / total;
                    for width in &mut widths {
                        *width *= scale;
                    }
                }
                widths
            }
            None => Self::equal_split(columns.len(), usable_width),
        };

        let mut offsets = Vec::with_capacity(widths.len());
        let mut cursor = 0.0;
        for width in &widths {
            offsets.push(cursor);
            cursor += width;
        }

        Self { widths, offsets }
    }

    fn equal_split(count: usize, usable_width: f64) -> Vec<f64> {
        if count == 0 {
            return Vec::new();
        }
        vec![usable_width / count as f64; count]
    }

    /// Column widths in millimetres.
    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    /// X-offsets from the content-area left edge, in millimetres.
    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    /// Number of planned columns.
    pub fn len(&self) -> usize {
        self.widths.len()
    }

    /// Returns `true` when no columns were planned.
    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }
}

/// Truncates `text` so its measured width fits within `max_width`.
///
/// `measure` maps a string slice to its rendered width in millimetres; the
/// renderer passes a font-cache-backed closure, tests can pass synthetic
/// metrics.  Text that fits is returned unchanged.  Otherwise the longest
/// prefix whose width plus the ellipsis stays within `max_width` is returned
/// with [`ELLIPSIS`] appended; the prefix alone never measures wider than
/// `max_width`.
pub fn truncate_to_width<F>(text: &str, max_width: f64, measure: F) -> String
where
    F: Fn(&str) -> f64,
{
    if measure(text) <= max_width {
        return text.to_owned();
    }

    let ellipsis_width = measure(ELLIPSIS);
    let budget = (max_width - ellipsis_width).max(0.0);

    let mut prefix_end = 0;
    for (index, ch) in text.char_indices() {
        let candidate_end = index + ch.len_utf8();
        if measure(&text[..candidate_end]) > budget {
            break;
        }
        prefix_end = candidate_end;
    }

    let mut truncated = text[..prefix_end].to_owned();
    truncated.push_str(ELLIPSIS);
    truncated
}
