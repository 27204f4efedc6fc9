/// Latent numeric encoding of a [`Scalar`] cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    /// Empty construction; presents as `(nil)`.
    None,
    /// The whole text is a strict decimal integer.
    Int,
    /// The whole text parses as a float but not as a strict integer.
    Double,
    /// Opaque content.
    Bytes,
}

#[derive(Clone, Debug)]
enum Repr {
    Absent,
    Int(i64),
    Double(f64),
    Bytes,
}

/// A string cell that keeps the parsed numeric form alongside its text, so
/// repeated increments never re-parse. Arithmetic regenerates the text; the
/// float path downgrades back to `Int` whenever the result lands exactly on
/// an integer.
#[derive(Clone, Debug)]
pub struct Scalar {
    text: String,
    repr: Repr,
}

impl Scalar {
    /// An absent cell with no content.
    pub fn new() -> Self {
        Scalar {
            text: String::new(),
            repr: Repr::Absent,
        }
    }

    /// Parses `text` greedily: strict decimal integer first (no sign, no
    /// leading zero other than `"0"` itself), then float (sign, leading
    /// zeros and scientific notation allowed, no trailing junk), else
    /// opaque bytes.
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            return Scalar::new();
        }
        if text.bytes().all(|b| b.is_ascii_digit()) {
            if text != "0" && text.starts_with('0') {
                // A redundant leading zero makes all-digit text opaque;
                // only non-digit characters can reach the float parser.
                return Scalar {
                    text: text.to_string(),
                    repr: Repr::Bytes,
                };
            }
            // Out-of-range integers fall through to the float attempt.
            if let Ok(v) = text.parse::<i64>() {
                return Scalar {
                    text: text.to_string(),
                    repr: Repr::Int(v),
                };
            }
        }
        if let Ok(v) = text.parse::<f64>() {
            return Scalar {
                text: text.to_string(),
                repr: Repr::Double(v),
            };
        }
        Scalar {
            text: text.to_string(),
            repr: Repr::Bytes,
        }
    }

    pub fn encoding(&self) -> Encoding {
        match self.repr {
            Repr::Absent => Encoding::None,
            Repr::Int(_) => Encoding::Int,
            Repr::Double(_) => Encoding::Double,
            Repr::Bytes => Encoding::Bytes,
        }
    }

    /// The reply form: raw text for numeric encodings, double-quoted text
    /// for opaque content, `(nil)` for an absent cell.
    pub fn present(&self) -> String {
        match self.repr {
            Repr::Int(_) | Repr::Double(_) => self.text.clone(),
            Repr::Bytes => format!("\"{}\"", self.text),
            Repr::Absent => "(nil)".to_string(),
        }
    }

    /// Applies an integer delta. Meaningful only for `Int` cells; callers
    /// check the encoding first and every other encoding is left untouched.
    pub fn add_int(&mut self, delta: i64) {
        if let Repr::Int(v) = self.repr {
            self.repr = Repr::Int(v.wrapping_add(delta));
            self.regenerate_text();
        }
    }

    /// Applies a float delta to an `Int` or `Double` cell. A result that is
    /// exactly an integer downgrades the cell to `Int`.
    pub fn add_float(&mut self, delta: f64) {
        let val = match self.repr {
            Repr::Int(v) => v as f64,
            Repr::Double(v) => v,
            _ => return,
        } + delta;
        if val == val.trunc() && val >= i64::MIN as f64 && val <= i64::MAX as f64 {
            self.repr = Repr::Int(val as i64);
        } else {
            self.repr = Repr::Double(val);
        }
        self.regenerate_text();
    }

    fn regenerate_text(&mut self) {
        match self.repr {
            Repr::Int(v) => self.text = v.to_string(),
            Repr::Double(v) => self.text = format!("{v:.6}"),
            _ => {}
        }
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::new()
    }
}
