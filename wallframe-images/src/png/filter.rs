//! PNG filter reversal.

/// PNG filter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    /// No filter.
    None = 0,
    /// Sub filter (difference from left pixel).
    Sub = 1,
    /// Up filter (difference from pixel above).
    Up = 2,
    /// Average filter (average of left and above).
    Average = 3,
    /// Paeth filter (predictor based on left, above, upper-left).
    Paeth = 4,
}

impl FilterType {
    /// Create from byte value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(FilterType::None),
            1 => Some(FilterType::Sub),
            2 => Some(FilterType::Up),
            3 => Some(FilterType::Average),
            4 => Some(FilterType::Paeth),
            _ => None,
        }
    }
}

/// Reverse a row filter in place.
///
/// `previous` is the reconstructed row above; for the first row callers pass
/// an all-zero row of the same length. Bytes left of the first pixel count as
/// zero.
pub fn unfilter_row(
    filter_type: FilterType,
    current: &mut [u8],
    previous: &[u8],
    bytes_per_pixel: usize,
) {
    debug_assert_eq!(current.len(), previous.len());

    match filter_type {
        FilterType::None => {}
        FilterType::Sub => {
            for i in bytes_per_pixel..current.len() {
                current[i] = current[i].wrapping_add(current[i - bytes_per_pixel]);
            }
        }
        FilterType::Up => {
            for (cur, &up) in current.iter_mut().zip(previous) {
                *cur = cur.wrapping_add(up);
            }
        }
        FilterType::Average => {
            for i in 0..current.len() {
                let left = if i >= bytes_per_pixel {
                    current[i - bytes_per_pixel] as u16
                } else {
                    0
                };
                let above = previous[i] as u16;
                current[i] = current[i].wrapping_add(((left + above) / 2) as u8);
            }
        }
        FilterType::Paeth => {
            for i in 0..current.len() {
                let (a, c) = if i >= bytes_per_pixel {
                    (current[i - bytes_per_pixel], previous[i - bytes_per_pixel])
                } else {
                    (0, 0)
                };
                let b = previous[i];
                current[i] = current[i].wrapping_add(paeth_predictor(a, b, c));
            }
        }
    }
}

/// Paeth predictor function.
///
/// Picks whichever of `a` (left), `b` (above) or `c` (upper-left) is closest
/// to `a + b - c`, preferring `a`, then `b`, on ties.
#[inline]
pub fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let pa = (b as i16 - c as i16).abs();
    let pb = (a as i16 - c as i16).abs();
    let pc = (a as i16 + b as i16 - 2 * c as i16).abs();

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}
