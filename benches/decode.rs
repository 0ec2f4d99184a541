use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gifmodel::Decoder;
use std::io::Cursor;

/// Pack literal codes into image data, clearing before the code size grows
fn image_data(pixels: &[u8]) -> Vec<u8> {
    let (mut code, mut n_bits, mut bytes) = (0u32, 0u32, vec![]);
    let mut pack = |c: u32| {
        code |= c << n_bits;
        n_bits += 3;
        while n_bits >= 8 {
            bytes.push(code as u8);
            code >>= 8;
            n_bits -= 8;
        }
    };
    for chunk in pixels.chunks(2) {
        pack(4);
        for p in chunk {
            pack(u32::from(*p));
        }
    }
    pack(5);
    if n_bits > 0 {
        bytes.push(code as u8);
    }
    let mut v = vec![2];
    for chunk in bytes.chunks(255) {
        v.push(chunk.len() as u8);
        v.extend_from_slice(chunk);
    }
    v.push(0);
    v
}

/// Build a GIF with several 64x64 images
fn synthetic_gif() -> Vec<u8> {
    let mut gif = b"GIF89a".to_vec();
    gif.extend_from_slice(&[64, 0, 64, 0, 0x81, 0, 0]);
    gif.extend_from_slice(&[0, 0, 0, 255, 0, 0, 0, 255, 0, 0, 0, 255]);
    for i in 0..8u8 {
        gif.extend_from_slice(&[0x21, 0xf9, 4, 0, 10, 0, 0, 0]);
        gif.extend_from_slice(&[0x2c, 0, 0, 0, 0, 64, 0, 64, 0, 0]);
        let pixels: Vec<u8> =
            (0..64 * 64).map(|p| ((p / 7) as u8 ^ i) & 3).collect();
        gif.extend_from_slice(&image_data(&pixels));
    }
    gif.push(0x3b);
    gif
}

fn decode_synthetic(crit: &mut Criterion) {
    let gif = synthetic_gif();

    crit.bench_function("decode", |b| {
        b.iter(|| {
            let model = Decoder::new(Cursor::new(black_box(&gif[..])))
                .decode()
                .unwrap();
            black_box(model);
        })
    });
}

criterion_group!(benches, decode_synthetic);
criterion_main!(benches);
