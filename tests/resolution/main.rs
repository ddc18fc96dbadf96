use insta::assert_debug_snapshot;
use set_dpi::{
    checksum, chunk_crc, decode, has_resolution, iter_chunks, locate, set_resolution, Error,
    Resolution, IDAT, IEND, PHYS, PNG_SIGNATURE,
};

fn chunk(chunk_type: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut bytes = (data.len() as u32).to_be_bytes().to_vec();
    bytes.extend(chunk_type);
    bytes.extend(data);
    bytes.extend(chunk_crc(chunk_type, data).to_be_bytes());
    bytes
}

fn png(chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut bytes = PNG_SIGNATURE.to_vec();
    for c in chunks {
        bytes.extend(c);
    }
    bytes
}

fn ihdr() -> Vec<u8> {
    chunk(b"IHDR", &[0, 0, 0, 2, 0, 0, 0, 2, 8, 6, 0, 0, 0])
}

fn idat() -> Vec<u8> {
    chunk(IDAT, &[0x78, 0x9c, 0x63, 0x60, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01])
}

/// Signature, one ancillary chunk, image data and the end marker.
fn minimal_png() -> Vec<u8> {
    png(&[ihdr(), chunk(b"tEXt", b"Comment\0hi"), idat(), chunk(IEND, &[])])
}

#[test]
fn inserts_before_image_data() {
    let original = minimal_png();
    let output = set_resolution(original.clone(), 96.0, 96.0).unwrap();
    assert_eq!(output.len(), original.len() + 21);

    let types: Vec<_> = iter_chunks(&output)
        .map(|c| *c.unwrap().chunk_type)
        .collect();
    assert_eq!(types, [*b"IHDR", *b"tEXt", *PHYS, *IDAT, *IEND]);

    let offset = locate(&output, PHYS, true).unwrap();
    let idat_offset = locate(&original, IDAT, false).unwrap();
    assert_eq!(offset, idat_offset);
    assert_eq!(&output[..idat_offset - 4], &original[..idat_offset - 4]);
    assert_eq!(&output[idat_offset + 17..], &original[idat_offset - 4..]);

    assert_debug_snapshot!(decode(&output, offset), @r###"
    Some(
        Resolution {
            x: 3780,
            y: 3780,
        },
    )
    "###);
}

#[test]
fn every_chunk_checks_out() {
    let output = set_resolution(minimal_png(), 300.0, 150.0).unwrap();
    for c in iter_chunks(&output) {
        let c = c.unwrap();
        let mut covered = c.chunk_type.to_vec();
        covered.extend(c.data);
        assert_eq!(checksum(&covered), c.crc);
        assert!(c.crc_is_valid());
    }
}

#[test]
fn round_trip() {
    for (dpi_x, dpi_y) in [(96.0, 96.0), (72.0, 300.0), (0.5, 2400.0), (0.0, 1.0)] {
        let output = set_resolution(minimal_png(), dpi_x, dpi_y).unwrap();
        let offset = locate(&output, PHYS, true).unwrap();
        let resolution = decode(&output, offset).unwrap();
        assert_eq!(
            resolution,
            Resolution {
                x: (dpi_x / 0.0254_f64).round() as u32,
                y: (dpi_y / 0.0254_f64).round() as u32,
            }
        );
        let stored_crc = u32::from_be_bytes(output[offset + 13..offset + 17].try_into().unwrap());
        assert_eq!(checksum(&output[offset..offset + 13]), stored_crc);
    }
}

#[test]
fn second_write_is_identical() {
    let first = set_resolution(minimal_png(), 120.0, 60.0).unwrap();
    let second = set_resolution(first.clone(), 120.0, 60.0).unwrap();
    assert_eq!(first, second);
}

#[test]
fn overwrites_unspecified_unit() {
    let mut payload = 5000_u32.to_be_bytes().to_vec();
    payload.extend(7000_u32.to_be_bytes());
    payload.push(0);
    let original = png(&[ihdr(), chunk(PHYS, &payload), idat(), chunk(IEND, &[])]);

    assert!(has_resolution(&original));
    let offset = locate(&original, PHYS, true).unwrap();
    assert_eq!(decode(&original, offset), None);

    let output = set_resolution(original.clone(), 96.0, 72.0).unwrap();
    assert_eq!(output.len(), original.len());
    assert_eq!(locate(&output, PHYS, true), Some(offset));
    assert_eq!(output[offset + 12], 1);
    assert_eq!(decode(&output, offset), Some(Resolution { x: 3780, y: 2835 }));
    assert_eq!(&output[offset + 17..], &original[offset + 17..]);
}

#[test]
fn stray_chunk_after_image_data() {
    let original = png(&[
        ihdr(),
        idat(),
        chunk(PHYS, &[0, 0, 0x0b, 0x13, 0, 0, 0x0b, 0x13, 1]),
        chunk(IEND, &[]),
    ]);
    assert!(!has_resolution(&original));
    assert_eq!(locate(&original, PHYS, true), None);

    let output = set_resolution(original.clone(), 96.0, 96.0).unwrap();
    assert_eq!(output.len(), original.len() + 21);
    let types: Vec<_> = iter_chunks(&output)
        .map(|c| *c.unwrap().chunk_type)
        .collect();
    assert_eq!(types, [*b"IHDR", *PHYS, *IDAT, *PHYS, *IEND]);
}

#[test]
fn malformed_input() {
    let short = &PNG_SIGNATURE[..7];
    assert_eq!(locate(short, PHYS, true), None);
    assert!(matches!(
        set_resolution(short.to_vec(), 96.0, 96.0),
        Err(Error::MalformedInput(_))
    ));

    let mut wrong_signature = minimal_png();
    wrong_signature[1] = b'X';
    assert!(matches!(
        set_resolution(wrong_signature, 96.0, 96.0),
        Err(Error::MalformedInput(_))
    ));

    let mut overlong = png(&[ihdr(), idat()]);
    overlong[8..12].copy_from_slice(&1000_u32.to_be_bytes());
    assert!(matches!(
        set_resolution(overlong, 96.0, 96.0),
        Err(Error::MalformedInput(_))
    ));
}

#[test]
fn missing_image_data() {
    let original = png(&[ihdr(), chunk(IEND, &[])]);
    assert!(matches!(
        set_resolution(original, 96.0, 96.0),
        Err(Error::MissingImageDataChunk)
    ));
}

#[test]
fn rejects_unrepresentable_dpi() {
    assert!(matches!(
        set_resolution(minimal_png(), -1.0, 96.0),
        Err(Error::IntegerOverflow { .. })
    ));
    assert!(matches!(
        set_resolution(minimal_png(), 96.0, 2.0e8),
        Err(Error::IntegerOverflow { .. })
    ));
}
