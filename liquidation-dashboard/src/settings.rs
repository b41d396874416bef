//! Settings form
//!
//! Draft copy of the filter that the user edits from the keyboard. Nothing
//! here touches the live [`FilterState`]; the binary hands the result of
//! [`SettingsForm::to_filter_state`] to `Session::apply_settings`.

use indexmap::IndexSet;

use crate::filter::FilterState;
use crate::symbol::Symbol;

/// Editable threshold fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdField {
    Liquidation,
    Trade,
}

impl ThresholdField {
    pub fn label(&self) -> &'static str {
        match self {
            ThresholdField::Liquidation => "Min Liq",
            ThresholdField::Trade => "Min Trade",
        }
    }
}

/// User-editable draft of symbol toggles and threshold text
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsForm {
    checked: IndexSet<Symbol>,
    liquidation_text: String,
    trade_text: String,
    editing: Option<ThresholdField>,
}

impl SettingsForm {
    /// Form pre-filled from the live filter
    pub fn from_filter(filter: &FilterState) -> Self {
        Self {
            checked: filter.active_symbols().clone(),
            liquidation_text: format!("{:.0}", filter.min_liquidation_value()),
            trade_text: format!("{:.0}", filter.min_trade_value()),
            editing: None,
        }
    }

    pub fn is_checked(&self, symbol: Symbol) -> bool {
        self.checked.contains(&symbol)
    }

    /// Flip one symbol checkbox, returning its new state
    pub fn toggle(&mut self, symbol: Symbol) -> bool {
        if self.checked.shift_remove(&symbol) {
            false
        } else {
            self.checked.insert(symbol);
            true
        }
    }

    /// Toggle by 1-based catalog position (the number keys)
    pub fn toggle_index(&mut self, index: usize) -> Option<bool> {
        let symbol = index
            .checked_sub(1)
            .and_then(|i| Symbol::ALL.get(i).copied())?;
        Some(self.toggle(symbol))
    }

    pub fn begin_edit(&mut self, field: ThresholdField) {
        self.editing = Some(field);
    }

    pub fn editing(&self) -> Option<ThresholdField> {
        self.editing
    }

    /// Append to the field being edited. Ignored when nothing is being edited.
    pub fn push_char(&mut self, c: char) {
        if let Some(field) = self.editing {
            self.field_mut(field).push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(field) = self.editing {
            self.field_mut(field).pop();
        }
    }

    pub fn finish_edit(&mut self) {
        self.editing = None;
    }

    /// Raw text as typed
    pub fn field_text(&self, field: ThresholdField) -> &str {
        match field {
            ThresholdField::Liquidation => &self.liquidation_text,
            ThresholdField::Trade => &self.trade_text,
        }
    }

    pub fn set_threshold_text(&mut self, field: ThresholdField, text: impl Into<String>) {
        *self.field_mut(field) = text.into();
    }

    /// Build the filter this form describes.
    ///
    /// Symbols come out in catalog order regardless of toggle order, and the
    /// threshold text is coerced with [`parse_threshold`].
    pub fn to_filter_state(&self) -> FilterState {
        let symbols = Symbol::ALL
            .into_iter()
            .filter(|symbol| self.checked.contains(symbol));
        FilterState::new(
            symbols,
            parse_threshold(&self.liquidation_text),
            parse_threshold(&self.trade_text),
        )
    }

    fn field_mut(&mut self, field: ThresholdField) -> &mut String {
        match field {
            ThresholdField::Liquidation => &mut self.liquidation_text,
            ThresholdField::Trade => &mut self.trade_text,
        }
    }
}

impl Default for SettingsForm {
    fn default() -> Self {
        Self::from_filter(&FilterState::default())
    }
}

/// Coerce threshold text to a whole USD amount.
///
/// Integer-prefix semantics: leading whitespace and an optional sign are
/// skipped, then the leading run of digits is taken ("12.9k" is 12). No
/// digits, or a negative result, gives 0.
pub fn parse_threshold(text: &str) -> f64 {
    let trimmed = text.trim();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let value = unsigned[..digits_end].parse::<f64>().unwrap_or(0.0);

    if negative || !value.is_finite() {
        0.0
    } else {
        value
    }
}
