#![cfg(feature = "rayon")]

use detdecode::{CoordSpace, DecodeConfig, Decoder, RawTensor, COCO_CLASSES};

fn make_tensor(predictions: usize) -> RawTensor {
    let cols = 5 + COCO_CLASSES;
    let mut data = Vec::with_capacity(predictions * cols);
    for i in 0..predictions {
        let t = i as f32 / predictions as f32;
        data.push((t * 37.0).fract());
        data.push((t * 53.0).fract());
        data.push(0.05 + (t * 11.0).fract() * 0.2);
        data.push(0.05 + (t * 7.0).fract() * 0.3);
        data.push((t * 97.0).fract());
        for k in 0..COCO_CLASSES {
            let score = ((i * 31 + k * 17) % 101) as f32 / 100.0;
            data.push(score);
        }
    }
    RawTensor::new(data, predictions, cols).unwrap()
}

#[test]
fn parallel_decode_matches_sequential() {
    let tensor = make_tensor(4_000);
    let base = DecodeConfig {
        confidence_threshold: 0.4,
        iou_threshold: 0.45,
        target_class: None,
        output_space: CoordSpace::Pixel {
            width: 1920,
            height: 1080,
        },
        ..DecodeConfig::default()
    };

    let seq = Decoder::new(DecodeConfig {
        parallel: false,
        ..base.clone()
    })
    .unwrap()
    .decode(tensor.view())
    .unwrap();
    let par = Decoder::new(DecodeConfig {
        parallel: true,
        ..base
    })
    .unwrap()
    .decode(tensor.view())
    .unwrap();

    assert!(!seq.is_empty());
    assert_eq!(seq, par);
}
