use std::fs;

use box_annotator::{
    crop_from_csv, export_bundle, export_records, read_csv, Config, CoordinateMapper, Error, Point,
    PointerHandler, RectManager,
};
use image::{Rgb, RgbImage};

/// 100x100 image whose red/green channels encode the pixel position.
fn gradient() -> RgbImage {
    RgbImage::from_fn(100, 100, |x, y| Rgb([x as u8, y as u8, 0]))
}

fn drag(rects: &mut RectManager, from: Point, to: Point) {
    rects.on_pointer_down(from);
    rects.on_pointer_move(to);
    rects.on_pointer_up(to);
}

#[test]
fn drawn_boxes_come_back_as_matching_crops() {
    let scratch = tempfile::tempdir().unwrap();
    let source_path = scratch.path().join("bill.png");
    let pixels = gradient();
    pixels.save(&source_path).unwrap();

    // 200x100 surface: the square image is pillarboxed 50px from the left.
    let mapper = CoordinateMapper::new((200, 100), (100, 100)).unwrap();
    assert_eq!(mapper.mapping().offset_x, 50);

    let mut rects = RectManager::new();
    rects.toggle(true);
    drag(&mut rects, Point::new(60, 10), Point::new(100, 50));
    drag(&mut rects, Point::new(130, 90), Point::new(110, 70));
    drag(&mut rects, Point::new(5, 5), Point::new(6, 6));
    assert_eq!(rects.len(), 2);

    let records = export_records(rects.rects(), &mapper);
    assert_eq!(records[0].bounding_box(), (10, 10, 50, 50));

    let config = Config {
        export_root: scratch.path().join("exports"),
        ..Config::default()
    };
    let bundle = export_bundle(
        &config,
        Some((&source_path, &pixels)),
        &records,
        chrono::Local::now(),
    )
    .unwrap();
    assert_eq!(read_csv(&bundle.csv_path).unwrap(), records);

    let written = crop_from_csv(&bundle.image_path, &bundle.csv_path, &bundle.dir).unwrap();
    assert_eq!(
        written,
        vec![
            bundle.dir.join("cropped_001.png"),
            bundle.dir.join("cropped_002.png"),
        ]
    );

    let first = image::open(&written[0]).unwrap().to_rgb8();
    assert_eq!(first.dimensions(), (40, 40));
    assert_eq!(first.get_pixel(0, 0), &Rgb([10, 10, 0]));
    assert_eq!(first.get_pixel(39, 39), &Rgb([49, 49, 0]));

    let (x1, y1, x2, y2) = records[1].bounding_box();
    let second = image::open(&written[1]).unwrap().to_rgb8();
    assert_eq!(second.dimensions(), ((x2 - x1) as u32, (y2 - y1) as u32));
    assert_eq!(second.get_pixel(0, 0), &Rgb([x1 as u8, y1 as u8, 0]));
}

#[test]
fn a_bad_row_aborts_before_any_crop_is_written() {
    let scratch = tempfile::tempdir().unwrap();
    let image_path = scratch.path().join("scan.png");
    gradient().save(&image_path).unwrap();
    let csv_path = scratch.path().join("boxes.csv");
    fs::write(
        &csv_path,
        "index,tl_x,tl_y,tr_x,tr_y,br_x,br_y,bl_x,bl_y\n\
         1,0,0,10,0,10,10,0,10\n\
         2,0,0,x,0,10,10,0,10\n",
    )
    .unwrap();
    let out = scratch.path().join("crops");

    let err = crop_from_csv(&image_path, &csv_path, &out).unwrap_err();
    assert!(matches!(err, Error::Csv { .. }), "{err}");
    assert!(!out.exists());
}

#[test]
fn a_box_outside_the_image_aborts_the_run() {
    let scratch = tempfile::tempdir().unwrap();
    let image_path = scratch.path().join("scan.png");
    gradient().save(&image_path).unwrap();
    let csv_path = scratch.path().join("boxes.csv");
    fs::write(
        &csv_path,
        "index,tl_x,tl_y,tr_x,tr_y,br_x,br_y,bl_x,bl_y\n\
         1,0,0,10,0,10,10,0,10\n\
         2,150,0,180,0,180,20,150,20\n",
    )
    .unwrap();

    let err = crop_from_csv(&image_path, &csv_path, scratch.path()).unwrap_err();
    assert!(matches!(err, Error::EmptyRegion { index: 2, .. }), "{err}");
    assert!(!scratch.path().join("cropped_001.png").exists());
}

#[test]
fn undecodable_image_is_reported() {
    let scratch = tempfile::tempdir().unwrap();
    let image_path = scratch.path().join("broken.png");
    fs::write(&image_path, b"not a png").unwrap();
    let csv_path = scratch.path().join("boxes.csv");
    fs::write(&csv_path, "index,tl_x,tl_y,tr_x,tr_y,br_x,br_y,bl_x,bl_y\n").unwrap();

    let err = crop_from_csv(&image_path, &csv_path, scratch.path()).unwrap_err();
    assert!(matches!(err, Error::ImageDecode { .. }), "{err}");
}

#[test]
fn a_repeated_index_keeps_the_last_row() {
    let scratch = tempfile::tempdir().unwrap();
    let image_path = scratch.path().join("scan.png");
    gradient().save(&image_path).unwrap();
    let csv_path = scratch.path().join("boxes.csv");
    fs::write(
        &csv_path,
        "index,tl_x,tl_y,tr_x,tr_y,br_x,br_y,bl_x,bl_y\n\
         1,0,0,10,0,10,10,0,10\n\
         1,20,30,40,30,40,35,20,35\n",
    )
    .unwrap();

    let written = crop_from_csv(&image_path, &csv_path, scratch.path()).unwrap();
    assert_eq!(written.len(), 2);
    assert_eq!(written[0], written[1]);

    let kept = image::open(&written[0]).unwrap().to_rgb8();
    assert_eq!(kept.dimensions(), (20, 5));
    assert_eq!(kept.get_pixel(0, 0), &Rgb([20, 30, 0]));
}
