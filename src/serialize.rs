//! Compact preorder byte-stream serialization (§4.4): LEB128 varints, a
//! self-describing header, and a preorder node stream whose decoder
//! reconstructs child arity from the rectangle it is tracking rather than
//! from a stored flag.

use std::io::Write;

use thiserror::Error;

use crate::country::{CountryTable, IsoCode, ISO_CODE_LEN};
use crate::geometry::Rectangle;
use crate::node::Node;
use crate::quantize::Precision;

pub const MAGIC: u32 = 0x51_47_54_31; // "QGT1"
pub const FORMAT_VERSION: u16 = 1;

const TAG_LEAF: u64 = 0;
const TAG_INTERNAL: u64 = 1;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("truncated stream: expected more bytes while reading {0}")]
    Truncated(&'static str),
    #[error("bad magic: expected {expected:#x}, found {found:#x}")]
    BadMagic { expected: u32, found: u32 },
    #[error("unsupported format version {found}, expected {expected}")]
    VersionMismatch { expected: u16, found: u16 },
    #[error("varint overflowed 64 bits")]
    VarintOverflow,
    #[error("unknown node tag {0}")]
    UnknownTag(u64),
    #[error("country table entry is not valid utf-8")]
    BadCountryCode,
}

/// Encodes `value` as an unsigned LEB128 varint into `out`.
pub fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            break;
        } else {
            out.push(byte | 0x80);
        }
    }
}

/// Decodes an unsigned LEB128 varint from `bytes` starting at `offset`,
/// returning the value and the number of bytes consumed.
pub fn read_varint(bytes: &[u8], offset: usize) -> Result<(u64, usize), DecodeError> {
    let mut value: u64 = 0;
    let mut shift = 0u32;
    let mut pos = offset;
    loop {
        let byte = *bytes
            .get(pos)
            .ok_or(DecodeError::Truncated("varint"))?;
        pos += 1;
        if shift >= 64 {
            return Err(DecodeError::VarintOverflow);
        }
        value |= ((byte & 0x7f) as u64) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
    }
    Ok((value, pos - offset))
}

/// Serializes a complete tree to a self-describing byte stream (§4.4).
pub fn serialize(root: &Node, root_rect: Rectangle, precision: Precision, table: &CountryTable) -> Vec<u8> {
    let mut out = Vec::new();
    write_header(&mut out, root_rect, precision, table);
    serialize_node(&mut out, root);
    out
}

fn write_header(out: &mut Vec<u8>, root_rect: Rectangle, precision: Precision, table: &CountryTable) {
    out.extend_from_slice(&MAGIC.to_le_bytes());
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.push(precision.as_u8());
    write_varint(out, root_rect.x0 as u64);
    write_varint(out, root_rect.y0 as u64);
    write_varint(out, root_rect.x1 as u64);
    write_varint(out, root_rect.y1 as u64);
    // Zero-id elision flag: always false in this implementation (§9 Open
    // Question decision); reserved so a future encoder can flip it without
    // a version bump.
    out.push(0u8);
    write_varint(out, table.len() as u64);
    for code in table.codes() {
        out.extend_from_slice(&code.0);
    }
}

fn serialize_node(out: &mut Vec<u8>, node: &Node) {
    match node {
        Node::Leaf(id) => {
            write_varint(out, TAG_LEAF);
            write_varint(out, *id as u64);
        }
        Node::Internal(children) => {
            write_varint(out, TAG_INTERNAL);
            // Children are emitted in the order `Rectangle::children` would
            // produce them (NW,NE,SW,SE or the degenerate two-child forms);
            // the builder is responsible for constructing `children` in that
            // order, so no explicit ordering tag needs to be stored here.
            for child in children {
                serialize_node(out, child);
            }
        }
    }
}

/// Parsed stream header, returned alongside the body's starting offset.
pub struct Header {
    pub precision: Precision,
    pub root_rect: Rectangle,
    pub zero_elided: bool,
    pub table: CountryTable,
}

pub fn read_header(bytes: &[u8]) -> Result<(Header, usize), DecodeError> {
    if bytes.len() < 4 {
        return Err(DecodeError::Truncated("magic"));
    }
    let magic = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
    if magic != MAGIC {
        return Err(DecodeError::BadMagic { expected: MAGIC, found: magic });
    }
    if bytes.len() < 6 {
        return Err(DecodeError::Truncated("version"));
    }
    let version = u16::from_le_bytes(bytes[4..6].try_into().unwrap());
    if version != FORMAT_VERSION {
        return Err(DecodeError::VersionMismatch { expected: FORMAT_VERSION, found: version });
    }
    let precision_byte = *bytes.get(6).ok_or(DecodeError::Truncated("precision"))?;
    let precision = Precision::new(precision_byte)
        .map_err(|_| DecodeError::Truncated("precision out of range"))?;

    let mut offset = 7usize;
    let (x0, n) = read_varint(bytes, offset)?;
    offset += n;
    let (y0, n) = read_varint(bytes, offset)?;
    offset += n;
    let (x1, n) = read_varint(bytes, offset)?;
    offset += n;
    let (y1, n) = read_varint(bytes, offset)?;
    offset += n;

    let root_rect = Rectangle {
        x0: x0 as u32,
        y0: y0 as u32,
        x1: x1 as u32,
        y1: y1 as u32,
    };

    let zero_elided = *bytes.get(offset).ok_or(DecodeError::Truncated("elision flag"))? != 0;
    offset += 1;

    let (count, n) = read_varint(bytes, offset)?;
    offset += n;

    let mut codes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        if offset + ISO_CODE_LEN > bytes.len() {
            return Err(DecodeError::Truncated("country code"));
        }
        let mut buf = [0u8; ISO_CODE_LEN];
        buf.copy_from_slice(&bytes[offset..offset + ISO_CODE_LEN]);
        codes.push(IsoCode(buf));
        offset += ISO_CODE_LEN;
    }
    let table = CountryTable::new(codes).map_err(|_| DecodeError::BadCountryCode)?;

    Ok((
        Header {
            precision,
            root_rect,
            zero_elided,
            table,
        },
        offset,
    ))
}

/// Fully decodes a tree from the body, tracking the rectangle exactly as
/// the runtime traversal does, so arity is always unambiguous (§4.4).
pub fn deserialize_tree(bytes: &[u8], offset: usize, rect: Rectangle) -> Result<(Node, usize), DecodeError> {
    let (tag, n) = read_varint(bytes, offset)?;
    let mut pos = offset + n;
    match tag {
        TAG_LEAF => {
            let (id, n) = read_varint(bytes, pos)?;
            pos += n;
            Ok((Node::Leaf(id as u16), pos - offset))
        }
        TAG_INTERNAL => {
            let children_rects = rect.children();
            let mut children = Vec::with_capacity(children_rects.len());
            for (_, child_rect) in children_rects {
                let (child, consumed) = deserialize_tree(bytes, pos, child_rect)?;
                pos += consumed;
                children.push(child);
            }
            Ok((Node::Internal(children), pos - offset))
        }
        other => Err(DecodeError::UnknownTag(other)),
    }
}

/// Convenience: parse the header, then the body, into an owned `Node` tree.
pub fn deserialize(bytes: &[u8]) -> Result<(Header, Node), DecodeError> {
    let (header, body_offset) = read_header(bytes)?;
    let (node, _) = deserialize_tree(bytes, body_offset, header.root_rect)?;
    Ok((header, node))
}

/// Writes `bytes` to `writer`; thin helper kept symmetrical with
/// `crate::io`'s file-level read/write helpers.
pub fn write_all(writer: &mut impl Write, bytes: &[u8]) -> std::io::Result<()> {
    writer.write_all(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::country::IsoCode;

    fn table() -> CountryTable {
        CountryTable::new(vec![
            IsoCode::EMPTY,
            IsoCode::from_str("USA").unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn varint_round_trips() {
        for value in [0u64, 1, 127, 128, 300, u64::MAX, 1 << 40] {
            let mut buf = Vec::new();
            write_varint(&mut buf, value);
            let (decoded, consumed) = read_varint(&buf, 0).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(consumed, buf.len());
        }
    }

    #[test]
    fn single_leaf_tree_round_trips() {
        let precision = Precision::from_u8(0);
        let rect = Rectangle::root(precision.x_max(), precision.y_max());
        let root = Node::Leaf(7);
        let bytes = serialize(&root, rect, precision, &table());
        let (header, decoded) = deserialize(&bytes).unwrap();
        assert_eq!(decoded, root);
        assert_eq!(header.root_rect, rect);
        assert_eq!(header.precision.as_u8(), 0);
        assert!(!header.zero_elided);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut bytes = serialize(&Node::Leaf(1), Rectangle::root(360, 180), Precision::from_u8(0), &table());
        bytes[0] ^= 0xff;
        assert!(matches!(read_header(&bytes), Err(DecodeError::BadMagic { .. })));
    }

    #[test]
    fn truncated_stream_is_rejected() {
        let bytes = serialize(&Node::Leaf(1), Rectangle::root(360, 180), Precision::from_u8(0), &table());
        let truncated = &bytes[..bytes.len() - 2];
        assert!(deserialize(truncated).is_err());
    }

    #[test]
    fn internal_node_round_trips() {
        let precision = Precision::from_u8(0);
        let rect = Rectangle::root(precision.x_max(), precision.y_max());
        let root = Node::Internal(vec![Node::Leaf(1), Node::Leaf(2), Node::Leaf(3), Node::Leaf(4)]);
        let bytes = serialize(&root, rect, precision, &table());
        let (_, decoded) = deserialize(&bytes).unwrap();
        assert_eq!(decoded, root);
    }
}
