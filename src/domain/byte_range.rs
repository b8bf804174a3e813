/// A single `Range: bytes=...` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// `bytes=start-end`, or `bytes=start-` when `end` is absent.
    From { start: u64, end: Option<u64> },
    /// `bytes=-n`: the last `n` bytes.
    Suffix(u64),
}

/// Inclusive byte window resolved against a known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    pub start: u64,
    pub end: u64,
}

impl ResolvedRange {
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("malformed range header: {0}")]
    Malformed(String),
    #[error("range not satisfiable for size {0}")]
    Unsatisfiable(u64),
}

impl ByteRange {
    pub fn parse(header: &str) -> Result<Self, RangeError> {
        let spec = header
            .trim()
            .strip_prefix("bytes=")
            .ok_or_else(|| RangeError::Malformed(header.to_string()))?;

        if spec.contains(',') {
            return Err(RangeError::Malformed(header.to_string()));
        }

        let (start, end) = spec
            .split_once('-')
            .ok_or_else(|| RangeError::Malformed(header.to_string()))?;
        let parse = |s: &str| {
            s.trim()
                .parse::<u64>()
                .map_err(|_| RangeError::Malformed(header.to_string()))
        };

        match (start.trim().is_empty(), end.trim().is_empty()) {
            (true, true) => Err(RangeError::Malformed(header.to_string())),
            (true, false) => Ok(ByteRange::Suffix(parse(end)?)),
            (false, true) => Ok(ByteRange::From {
                start: parse(start)?,
                end: None,
            }),
            (false, false) => {
                let start = parse(start)?;
                let end = parse(end)?;
                if end < start {
                    return Err(RangeError::Malformed(header.to_string()));
                }
                Ok(ByteRange::From {
                    start,
                    end: Some(end),
                })
            }
        }
    }

    /// Clamps the range to `size`; an open or oversized end means the last byte.
    pub fn resolve(&self, size: u64) -> Result<ResolvedRange, RangeError> {
        if size == 0 {
            return Err(RangeError::Unsatisfiable(size));
        }
        let last = size - 1;
        match *self {
            ByteRange::From { start, end } => {
                if start > last {
                    return Err(RangeError::Unsatisfiable(size));
                }
                Ok(ResolvedRange {
                    start,
                    end: end.map_or(last, |e| e.min(last)),
                })
            }
            ByteRange::Suffix(0) => Err(RangeError::Unsatisfiable(size)),
            ByteRange::Suffix(n) => Ok(ResolvedRange {
                start: size.saturating_sub(n),
                end: last,
            }),
        }
    }

    pub fn to_header_value(&self) -> String {
        match self {
            ByteRange::From {
                start,
                end: Some(end),
            } => format!("bytes={}-{}", start, end),
            ByteRange::From { start, end: None } => format!("bytes={}-", start),
            ByteRange::Suffix(n) => format!("bytes=-{}", n),
        }
    }
}
