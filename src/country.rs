//! Country table (C): dense `countryId -> ISO alpha-3 code` plus an inverse
//! lookup built from a sorted index at decode time. `countryId = 0` is
//! reserved for "no country / ocean" and maps to the empty code (§4.6).

use std::path::Path;

use thiserror::Error;

use crate::node::CountryId;

pub const ISO_CODE_LEN: usize = 3;

#[derive(Error, Debug)]
pub enum CountryTableError {
    #[error("country table is missing the reserved id 0 (ocean/no country) entry")]
    MissingZeroEntry,
    #[error("ISO code {0:?} for id {1} is longer than {ISO_CODE_LEN} bytes")]
    CodeTooLong(String, CountryId),
    #[error("duplicate country id {0} in table")]
    DuplicateId(CountryId),
    #[error("could not read country table CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("could not read country table file: {0}")]
    Io(#[from] std::io::Error),
}

/// A fixed-width (3-byte) ISO alpha-3 code, or the empty code for id 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsoCode(pub [u8; ISO_CODE_LEN]);

impl IsoCode {
    pub const EMPTY: IsoCode = IsoCode([0u8; ISO_CODE_LEN]);

    pub fn from_str(code: &str) -> Result<Self, String> {
        let bytes = code.as_bytes();
        if bytes.len() > ISO_CODE_LEN {
            return Err(code.to_string());
        }
        let mut buf = [0u8; ISO_CODE_LEN];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(IsoCode(buf))
    }

    pub fn as_str(&self) -> &str {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(ISO_CODE_LEN);
        std::str::from_utf8(&self.0[..end]).unwrap_or("")
    }
}

/// Dense `countryId -> code` table with a sorted `code -> countryId` index
/// built once at construction/decode time (§4.6).
#[derive(Debug, Clone)]
pub struct CountryTable {
    codes: Vec<IsoCode>,
    sorted_index: Vec<(IsoCode, CountryId)>,
}

impl CountryTable {
    /// Builds a table from a dense `codes[k]` = code for `countryId = k`
    /// list. `codes[0]` is forced to the empty code regardless of input,
    /// per §4.6.
    pub fn new(mut codes: Vec<IsoCode>) -> Result<Self, CountryTableError> {
        if codes.is_empty() {
            codes.push(IsoCode::EMPTY);
        }
        codes[0] = IsoCode::EMPTY;

        let mut sorted_index: Vec<(IsoCode, CountryId)> = codes
            .iter()
            .enumerate()
            .skip(1)
            .map(|(id, code)| (*code, id as CountryId))
            .collect();
        sorted_index.sort_by(|a, b| a.0 .0.cmp(&b.0 .0));
        for pair in sorted_index.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(CountryTableError::DuplicateId(pair[1].1));
            }
        }

        Ok(CountryTable { codes, sorted_index })
    }

    /// Loads a table from a two-column CSV file (`id,code`), grounded on the
    /// teacher's CSV-backed entity table pattern (`accumulators/ndm_smt/*`).
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, CountryTableError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut codes = vec![IsoCode::EMPTY];
        for record in reader.records() {
            let record = record?;
            let id: CountryId = record
                .get(0)
                .unwrap_or("0")
                .parse()
                .unwrap_or(0);
            let code = IsoCode::from_str(record.get(1).unwrap_or(""))
                .map_err(|c| CountryTableError::CodeTooLong(c, id))?;
            if id as usize >= codes.len() {
                codes.resize(id as usize + 1, IsoCode::EMPTY);
            }
            codes[id as usize] = code;
        }
        CountryTable::new(codes)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// `true` if the table holds nothing beyond the reserved id-0
    /// (ocean/no-country) entry that `new` always forces in. `codes` itself
    /// is never empty, so this is not `codes.is_empty()`.
    pub fn is_empty(&self) -> bool {
        self.codes.len() <= 1
    }

    pub fn code_for(&self, id: CountryId) -> IsoCode {
        self.codes.get(id as usize).copied().unwrap_or(IsoCode::EMPTY)
    }

    pub fn id_for_code(&self, code: &str) -> CountryId {
        let needle = match IsoCode::from_str(code) {
            Ok(c) => c,
            Err(_) => return 0,
        };
        self.sorted_index
            .binary_search_by(|(c, _)| c.0.cmp(&needle.0))
            .ok()
            .map(|i| self.sorted_index[i].1)
            .unwrap_or(0)
    }

    pub fn codes(&self) -> &[IsoCode] {
        &self.codes
    }
}
