//! Randomized round-trips over the bit-packed primitive codec.
//!
//! Every writer method must be read back exactly by its reader mirror,
//! at any bit alignment, and the prefixed integer forms must use the
//! width their prefix promises.

use proptest::prelude::*;

use cadrw::types::Handle;
use cadrw::{BitReader, BitWriter, CadVersion, RecordReader, RecordWriter};

fn reader(w: BitWriter) -> BitReader {
    BitReader::new(w.into_data(), CadVersion::AC1015)
}

/// Shift the stream to an arbitrary bit alignment before the value.
fn misalign(w: &mut BitWriter, r_bits: &mut Vec<bool>, offset: u8) {
    for i in 0..offset {
        let bit = i % 2 == 0;
        w.write_bit(0, bit).unwrap();
        r_bits.push(bit);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn prop_bit_short_roundtrip(value: i16, offset in 0u8..8) {
        let mut w = BitWriter::new(CadVersion::AC1015);
        let mut lead = Vec::new();
        misalign(&mut w, &mut lead, offset);
        w.write_bit_short(0, value).unwrap();

        let mut r = reader(w);
        for bit in lead {
            prop_assert_eq!(r.get_bit().unwrap(), bit);
        }
        prop_assert_eq!(r.get_bit_short().unwrap(), value);
    }

    #[test]
    fn prop_bit_long_roundtrip(value: i32, offset in 0u8..8) {
        let mut w = BitWriter::new(CadVersion::AC1015);
        let mut lead = Vec::new();
        misalign(&mut w, &mut lead, offset);
        w.write_bit_long(0, value).unwrap();

        let mut r = reader(w);
        for bit in lead {
            prop_assert_eq!(r.get_bit().unwrap(), bit);
        }
        prop_assert_eq!(r.get_bit_long().unwrap(), value);
    }

    #[test]
    fn prop_bit_double_roundtrip(
        value in any::<f64>().prop_filter("finite", |v| v.is_finite()),
        offset in 0u8..8,
    ) {
        let mut w = BitWriter::new(CadVersion::AC1015);
        let mut lead = Vec::new();
        misalign(&mut w, &mut lead, offset);
        w.write_bit_double(0, value).unwrap();

        let mut r = reader(w);
        for bit in lead {
            prop_assert_eq!(r.get_bit().unwrap(), bit);
        }
        prop_assert_eq!(r.get_bit_double().unwrap(), value);
    }

    #[test]
    fn prop_bit_double_default_roundtrip(
        value in any::<f64>().prop_filter("finite", |v| v.is_finite()),
        default in any::<f64>().prop_filter("finite", |v| v.is_finite()),
    ) {
        let mut w = BitWriter::new(CadVersion::AC1015);
        w.write_bit_double_default(0, value, default).unwrap();
        let mut r = reader(w);
        prop_assert_eq!(r.get_bit_double_default(default).unwrap(), value);
    }

    #[test]
    fn prop_raw_values_roundtrip(
        c: u8,
        s: i16,
        l: i32,
        d in any::<f64>().prop_filter("finite", |v| v.is_finite()),
        offset in 0u8..8,
    ) {
        let mut w = BitWriter::new(CadVersion::AC1015);
        let mut lead = Vec::new();
        misalign(&mut w, &mut lead, offset);
        w.write_raw_char(0, c).unwrap();
        w.write_raw_short(0, s).unwrap();
        w.write_raw_long(0, l).unwrap();
        w.write_raw_double(0, d).unwrap();

        let mut r = reader(w);
        for bit in lead {
            prop_assert_eq!(r.get_bit().unwrap(), bit);
        }
        prop_assert_eq!(r.get_raw_char().unwrap(), c);
        prop_assert_eq!(r.get_raw_short().unwrap(), s);
        prop_assert_eq!(r.get_raw_long().unwrap(), l);
        prop_assert_eq!(r.get_raw_double().unwrap(), d);
    }

    #[test]
    fn prop_handle_roundtrip(value: u64, code in prop::sample::select(vec![5, 330, 340, 350])) {
        let mut w = BitWriter::new(CadVersion::AC1015);
        w.write_handle(code, Handle::new(value)).unwrap();
        let mut r = reader(w);
        prop_assert_eq!(r.get_handle().unwrap(), Handle::new(value));
    }

    #[test]
    fn prop_narrow_text_roundtrip(value in "[ -~]{0,48}") {
        let mut w = BitWriter::new(CadVersion::AC1015);
        w.write_variable_text(1, &value, CadVersion::AC1015, false).unwrap();
        let mut r = reader(w);
        prop_assert_eq!(
            r.get_variable_text(CadVersion::AC1015, false).unwrap(),
            value
        );
    }

    #[test]
    fn prop_wide_text_roundtrip(
        chars in prop::collection::vec(
            any::<char>().prop_filter("no nul", |c| *c != '\0'),
            0..24,
        )
    ) {
        let value: String = chars.into_iter().collect();
        let mut w = BitWriter::new(CadVersion::AC1021);
        w.write_variable_text(1, &value, CadVersion::AC1021, false).unwrap();
        let mut r = BitReader::new(w.into_data(), CadVersion::AC1021);
        prop_assert_eq!(
            r.get_variable_text(CadVersion::AC1021, false).unwrap(),
            value
        );
    }

    #[test]
    fn prop_bit_short_prefix_width(value: i16) {
        let mut w = BitWriter::new(CadVersion::AC1015);
        w.write_bit_short(0, value).unwrap();
        let expected = match value {
            0 | 256 => 2,
            1..=255 => 10,
            _ => 18,
        };
        prop_assert_eq!(w.bit_position(), expected, "value {}", value);
    }

    #[test]
    fn prop_bit_long_prefix_width(value: i32) {
        let mut w = BitWriter::new(CadVersion::AC1015);
        w.write_bit_long(0, value).unwrap();
        let expected = match value {
            0 => 2,
            1..=255 => 10,
            _ => 34,
        };
        prop_assert_eq!(w.bit_position(), expected, "value {}", value);
    }

    #[test]
    fn prop_mixed_sequence_roundtrip(
        items in prop::collection::vec(
            (
                any::<bool>(),
                any::<i16>(),
                any::<f64>().prop_filter("finite", |v| v.is_finite()),
            ),
            0..40,
        )
    ) {
        let mut w = BitWriter::new(CadVersion::AC1015);
        for (b, s, d) in &items {
            w.write_bit(0, *b).unwrap();
            w.write_bit_short(0, *s).unwrap();
            w.write_bit_double(0, *d).unwrap();
        }
        let mut r = reader(w);
        for (b, s, d) in &items {
            prop_assert_eq!(r.get_bit().unwrap(), *b);
            prop_assert_eq!(r.get_bit_short().unwrap(), *s);
            prop_assert_eq!(r.get_bit_double().unwrap(), *d);
        }
    }
}

#[test]
fn empty_text_is_a_two_bit_record() {
    let mut w = BitWriter::new(CadVersion::AC1015);
    w.write_variable_text(1, "", CadVersion::AC1015, false)
        .unwrap();
    assert_eq!(w.bit_position(), 2);
}

#[test]
fn absent_short_reads_back_as_256() {
    // Prefix 11 carries the absent marker; the reader maps it to 256.
    let mut r = BitReader::new(vec![0xC0], CadVersion::AC1015);
    assert_eq!(r.get_bit_short().unwrap(), 256);
}
