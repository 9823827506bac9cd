use approx::assert_relative_eq;
use ktx_core::{BufferLayout, PixelBuffer, PixelFormat, TextureType};
use ktx_io::ktx::{KtxReader, KtxWriter, SuperCompression};
use ktx_io::{ImageHeader, ImageReader, ImageWriter, IoError};

fn gradient_rgb32f(width: u32, height: u32) -> PixelBuffer {
    let data: Vec<f32> = (0..width * height * 3)
        .map(|i| (i % 97) as f32 * 0.125)
        .collect();
    PixelBuffer::from_f32(&data, PixelFormat::R32G32B32_SFLOAT, BufferLayout::new(width, height), None)
        .expect("float buffer")
}

fn face(fill: u8) -> PixelBuffer {
    PixelBuffer::from_bytes(vec![fill; 8 * 8 * 4], PixelFormat::R8G8B8A8_UNORM, BufferLayout::new(8, 8))
        .expect("face buffer")
}

#[test]
fn float_image_without_metadata() {
    let buffer = gradient_rgb32f(100, 100);
    let bytes = KtxWriter::new()
        .with_metadata(false)
        .write_to_memory(std::slice::from_ref(&buffer))
        .unwrap();

    let header = KtxReader::new().read_from_memory(&bytes).unwrap();
    assert_eq!(header.levels()[0].uncompressed_length, 100 * 100 * 12);
    assert_eq!(header.supercompression(), SuperCompression::Zlib);
    assert!(header.metadata().is_none());
    assert_eq!(header.index().kvd_offset, 0);

    let read = header.data().unwrap();
    assert_eq!(read.face_count(), 1);
    assert_eq!(read.layer_count(), 0);
    assert_eq!(read.depth(), 0);
    assert_eq!(read.format(), buffer.format());
    assert_eq!(read.packed().unwrap(), buffer.packed().unwrap());
}

#[test]
fn uncompressed_roundtrip_keeps_bytes() {
    let buffer = PixelBuffer::from_shorts(
        (0..16 * 4 * 3).map(|i| i as u16 * 257).collect(),
        PixelFormat::R16G16B16_UNORM,
        BufferLayout::new(16, 4),
    )
    .unwrap();
    let bytes = KtxWriter::new()
        .with_supercompression(SuperCompression::None)
        .write_to_memory(std::slice::from_ref(&buffer))
        .unwrap();

    let header = KtxReader::new().read_from_memory(&bytes).unwrap();
    assert_eq!(header.supercompression(), SuperCompression::None);
    assert_eq!(header.width(), 16);
    assert_eq!(header.height(), 4);
    assert_eq!(header.data().unwrap().packed().unwrap(), buffer.packed().unwrap());

    let kvd = header.metadata().unwrap();
    assert_eq!(kvd.get("MIN"), Some("0"));
    assert_eq!(kvd.get("MAX"), Some("255"));
}

#[test]
fn six_faces_make_a_cubemap() {
    let faces: Vec<PixelBuffer> = (0..6).map(|i| face(i * 40)).collect();
    let bytes = KtxWriter::new().write_to_memory(&faces).unwrap();

    let header = KtxReader::new().read_from_memory(&bytes).unwrap();
    assert_eq!(header.face_count(), 6);
    assert_eq!(header.texture_type(), TextureType::Cubemap);

    let read = header.data().unwrap();
    assert_eq!(read.texture_type(), TextureType::Cubemap);
    assert_eq!(read.image_count(), 6);
    for (i, face) in faces.iter().enumerate() {
        assert_eq!(read.image_bytes(i).unwrap(), face.packed().unwrap());
    }
}

#[test]
fn cubemap_buffer_roundtrips_as_one() {
    let layout = BufferLayout::new(4, 4).with_faces(6);
    let buffer = PixelBuffer::from_bytes(vec![3; 6 * 4 * 4], PixelFormat::R8_UNORM, layout).unwrap();
    let bytes = KtxWriter::new().write_to_memory(std::slice::from_ref(&buffer)).unwrap();
    let read = KtxReader::new().read_from_memory(&bytes).unwrap().data().unwrap();
    assert_eq!(read.layout(), layout);
    assert_eq!(read.packed().unwrap(), buffer.packed().unwrap());
}

#[test]
fn float_metadata_carries_luminance() {
    let data = [0.0f32, 0.5, 1.0, 4.0, 2.0, 0.25];
    let buffer = PixelBuffer::from_f32(&data, PixelFormat::R32G32B32_SFLOAT, BufferLayout::new(2, 1), None).unwrap();
    let bytes = KtxWriter::new().write_to_memory(std::slice::from_ref(&buffer)).unwrap();

    let header = KtxReader::new().read_from_memory(&bytes).unwrap();
    let kvd = header.metadata().expect("metadata");
    assert_eq!(kvd.len(), 3);
    assert_relative_eq!(kvd.get_f32("min").unwrap(), 0.0);
    assert_relative_eq!(kvd.get_f32("max").unwrap(), 4.0);
    let mean = buffer.hdr_properties().unwrap().unwrap().mean_luminance();
    assert_relative_eq!(kvd.get_f32("AVG").unwrap(), mean, max_relative = 1e-6);

    let read = header.data().unwrap();
    let props = read.hdr_properties().unwrap().unwrap();
    assert_relative_eq!(props.max_value(), 4.0);
}

#[test]
fn half_float_roundtrip() {
    let data: Vec<f32> = (0..4 * 4 * 4).map(|i| i as f32 / 8.0).collect();
    let buffer = PixelBuffer::from_f32(&data, PixelFormat::R16G16B16A16_SFLOAT, BufferLayout::new(4, 4), None).unwrap();
    let bytes = KtxWriter::new().write_to_memory(std::slice::from_ref(&buffer)).unwrap();
    let read = KtxReader::new().read_from_memory(&bytes).unwrap().data().unwrap();
    assert_eq!(read.packed().unwrap(), buffer.packed().unwrap());
    assert_eq!(read.as_f32(0).unwrap(), data);
}

#[test]
fn dfd_describes_format() {
    let bytes = KtxWriter::new().write_to_memory(&[face(1)]).unwrap();
    let header = KtxReader::new().read_from_memory(&bytes).unwrap();
    let block = &header.dfd().blocks()[0];
    assert_eq!(header.dfd().block_count(), 1);
    assert_eq!(block.samples().len(), 4);
    assert_eq!(block.bytes_plane()[0], 4);
    assert_eq!(block.samples()[3].bit_offset(), 24);
}

/// Rewrites the header height and the level-0 uncompressed length together.
fn patch_height(bytes: &mut [u8], height: u32, uncompressed: u64) {
    bytes[24..28].copy_from_slice(&height.to_le_bytes());
    bytes[96..104].copy_from_slice(&uncompressed.to_le_bytes());
}

#[test]
fn inflated_length_mismatch_is_corrupt() {
    let mut bytes = KtxWriter::new().write_to_memory(&[face(7)]).unwrap();
    patch_height(&mut bytes, 9, 8 * 9 * 4);

    let header = KtxReader::new().read_from_memory(&bytes).unwrap();
    assert!(matches!(
        header.data(),
        Err(IoError::CorruptPayload { expected: 288, actual: 256 })
    ));
}

#[test]
fn stored_length_mismatch_is_corrupt() {
    let mut bytes = KtxWriter::new()
        .with_supercompression(SuperCompression::None)
        .write_to_memory(&[face(7)])
        .unwrap();
    patch_height(&mut bytes, 9, 8 * 9 * 4);

    let header = KtxReader::new().read_from_memory(&bytes).unwrap();
    assert!(matches!(
        header.data(),
        Err(IoError::CorruptPayload { expected: 288, actual: 256 })
    ));
}

#[test]
fn declared_length_must_match_dimensions() {
    for scheme in [SuperCompression::Zlib, SuperCompression::None] {
        let written = KtxWriter::new()
            .with_supercompression(scheme)
            .write_to_memory(&[face(7)])
            .unwrap();
        for declared in [8 * 8 * 4 + 4u64, 1 << 46, u64::MAX] {
            let mut bytes = written.clone();
            bytes[96..104].copy_from_slice(&declared.to_le_bytes());
            assert!(
                matches!(
                    KtxReader::new().read_from_memory(&bytes),
                    Err(IoError::MalformedContainer(_))
                ),
                "{scheme:?} with declared length {declared}"
            );
        }
    }
}

#[test]
fn huge_dimensions_are_malformed() {
    let mut bytes = KtxWriter::new().write_to_memory(&[face(7)]).unwrap();
    for offset in [20, 24, 28, 32, 36] {
        bytes[offset..offset + 4].copy_from_slice(&u32::MAX.to_le_bytes());
    }
    assert!(matches!(
        KtxReader::new().read_from_memory(&bytes),
        Err(IoError::MalformedContainer(_))
    ));
}

#[test]
fn unsupported_supercompression() {
    let mut bytes = KtxWriter::new().write_to_memory(&[face(7)]).unwrap();
    bytes[44..48].copy_from_slice(&2u32.to_le_bytes());
    assert!(matches!(
        KtxReader::new().read_from_memory(&bytes),
        Err(IoError::UnsupportedSuperCompression(2))
    ));
}

#[test]
fn truncated_payload_is_malformed() {
    let bytes = KtxWriter::new().write_to_memory(&[face(7)]).unwrap();
    let truncated = &bytes[..bytes.len() - 1];
    assert!(matches!(
        KtxReader::new().read_from_memory(truncated),
        Err(IoError::MalformedContainer(_))
    ));
}

#[test]
fn unknown_vk_format() {
    let mut bytes = KtxWriter::new().write_to_memory(&[face(7)]).unwrap();
    bytes[12..16].copy_from_slice(&5000u32.to_le_bytes());
    assert!(matches!(
        KtxReader::new().read_from_memory(&bytes),
        Err(IoError::UnsupportedFormat(_))
    ));
}

#[test]
fn destroyed_header_rejects_access() {
    let bytes = KtxWriter::new().write_to_memory(&[face(7)]).unwrap();
    let mut header = KtxReader::new().read_from_memory(&bytes).unwrap();
    header.destroy();
    assert!(matches!(
        header.data(),
        Err(IoError::Core(ktx_core::Error::UseAfterDestroy))
    ));
}
