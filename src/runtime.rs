//! Runtime traversal (R): `lookup(lat, lon) -> countryId`, reproduced
//! bit-for-bit between the builder's own verification harness and whatever
//! host the generated artifact runs on (§4.5). This module owns no tree; it
//! streams directly over the serialized byte slice, skipping unchosen
//! subtrees without ever materializing them.

use crate::country::CountryTable;
use crate::geometry::Rectangle;
use crate::quantize::{quantize, Precision};
use crate::serialize::{read_header, read_varint, DecodeError};

/// A decoded stream header plus the body's starting offset, ready to serve
/// repeated lookups without re-parsing the header each time.
pub struct Table<'a> {
    bytes: &'a [u8],
    precision: Precision,
    root_rect: Rectangle,
    body_offset: usize,
    country_table: CountryTable,
}

impl<'a> Table<'a> {
    pub fn decode(bytes: &'a [u8]) -> Result<Self, DecodeError> {
        let (header, body_offset) = read_header(bytes)?;
        Ok(Table {
            bytes,
            precision: header.precision,
            root_rect: header.root_rect,
            body_offset,
            country_table: header.table,
        })
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn country_table(&self) -> &CountryTable {
        &self.country_table
    }

    /// §4.5 `lookup`: clamp and quantize, then traverse.
    pub fn lookup(&self, lat: f64, lon: f64) -> Result<u16, DecodeError> {
        let point = quantize(lat, lon, self.precision);
        self.lookup_lattice(point.ilat, point.ilon)
    }

    /// Traverse directly on lattice indices; used by tests that want to
    /// bypass quantization (e.g. scenario S4's exact-neighbor checks).
    pub fn lookup_lattice(&self, ilat: u32, ilon: u32) -> Result<u16, DecodeError> {
        let (id, _) = traverse_bytes(self.bytes, self.body_offset, self.root_rect, ilat, ilon)?;
        Ok(id)
    }
}

const TAG_LEAF: u64 = 0;
const TAG_INTERNAL: u64 = 1;

/// Streams over the preorder node encoding starting at `offset`, tracking
/// `rect` exactly the way the builder's serializer produced it, descending
/// toward `(ilat, ilon)` and skipping every sibling subtree it does not
/// enter. Returns the resolved country id and the number of bytes the whole
/// subtree occupied (so callers composing multiple `traverse_bytes` calls,
/// e.g. to skip a sibling, know how far to advance).
pub fn traverse_bytes(
    bytes: &[u8],
    offset: usize,
    rect: Rectangle,
    ilat: u32,
    ilon: u32,
) -> Result<(u16, usize), DecodeError> {
    let (tag, n) = read_varint(bytes, offset)?;
    let mut pos = offset + n;
    match tag {
        TAG_LEAF => {
            let (id, n) = read_varint(bytes, pos)?;
            pos += n;
            Ok((id as u16, pos - offset))
        }
        TAG_INTERNAL => {
            debug_assert!(!rect.is_point(), "internal node cannot have a point rectangle");
            let (wanted_idx, wanted_rect) = rect.child_containing(ilat, ilon);
            let mut result: Option<u16> = None;
            for (idx, child_rect) in rect.children() {
                if idx == wanted_idx {
                    let (id, consumed) = traverse_bytes(bytes, pos, wanted_rect, ilat, ilon)?;
                    pos += consumed;
                    result = Some(id);
                } else {
                    // Not the branch we want: skip over it without decoding
                    // its contents by recursively measuring its length.
                    let consumed = skip_subtree(bytes, pos, child_rect)?;
                    pos += consumed;
                }
            }
            let id = result.ok_or(DecodeError::UnknownTag(tag))?;
            Ok((id, pos - offset))
        }
        other => Err(DecodeError::UnknownTag(other)),
    }
}

/// Measures (without materializing) the byte length of the subtree encoded
/// at `offset` for rectangle `rect`, so traversal can skip siblings it does
/// not enter (§4.5 "skip over the other children's subtrees").
fn skip_subtree(bytes: &[u8], offset: usize, rect: Rectangle) -> Result<usize, DecodeError> {
    let (tag, n) = read_varint(bytes, offset)?;
    let mut pos = offset + n;
    match tag {
        TAG_LEAF => {
            let (_, n) = read_varint(bytes, pos)?;
            pos += n;
            Ok(pos - offset)
        }
        TAG_INTERNAL => {
            for (_, child_rect) in rect.children() {
                let consumed = skip_subtree(bytes, pos, child_rect)?;
                pos += consumed;
            }
            Ok(pos - offset)
        }
        other => Err(DecodeError::UnknownTag(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::country::IsoCode;
    use crate::node::Node;
    use crate::serialize::serialize;

    fn table() -> CountryTable {
        CountryTable::new(vec![IsoCode::EMPTY, IsoCode::from_str("USA").unwrap()]).unwrap()
    }

    #[test]
    fn lookup_equivalence_on_internal_tree() {
        // North/South split at p=0 (scenario S2).
        let precision = Precision::from_u8(0);
        let rect = Rectangle::root(precision.x_max(), precision.y_max());
        let root = Node::Internal(vec![
            Node::Leaf(1), // NW
            Node::Leaf(1), // NE
            Node::Leaf(2), // SW
            Node::Leaf(2), // SE
        ]);
        let bytes = serialize(&root, rect, precision, &table());
        let decoded = Table::decode(&bytes).unwrap();

        assert_eq!(decoded.lookup(45.0, 0.0).unwrap(), 1);
        assert_eq!(decoded.lookup(-45.0, 0.0).unwrap(), 2);
        // Boundary ilat=90 (Ymax/2): south owns ym.
        assert_eq!(decoded.lookup_lattice(90, 0).unwrap(), 2);
    }

    #[test]
    fn skips_unchosen_subtrees_without_materializing_them() {
        let precision = Precision::from_u8(0);
        let rect = Rectangle::root(precision.x_max(), precision.y_max());
        let root = Node::Internal(vec![
            Node::Leaf(11),
            Node::Internal(vec![Node::Leaf(1), Node::Leaf(2), Node::Leaf(3), Node::Leaf(4)]),
            Node::Leaf(33),
            Node::Leaf(44),
        ]);
        let bytes = serialize(&root, rect, precision, &table());
        let decoded = Table::decode(&bytes).unwrap();
        // SW quadrant (south-west) is leaf 33.
        let (xm, ym) = ((rect.x0 + rect.x1) / 2, (rect.y0 + rect.y1) / 2);
        assert_eq!(decoded.lookup_lattice(ym, xm).unwrap(), 33);
    }
}
