use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;

fn main() {
    let mut img = RgbImage::from_pixel(800, 600, Rgb([30, 90, 200]));

    // Two apples, one orange, one banana-colored disk
    draw_filled_circle_mut(&mut img, (150, 150), 70, Rgb([220, 20, 10]));
    draw_filled_circle_mut(&mut img, (400, 150), 65, Rgb([200, 30, 10]));
    draw_filled_circle_mut(&mut img, (650, 180), 75, Rgb([255, 122, 0]));
    draw_filled_circle_mut(&mut img, (400, 430), 80, Rgb([255, 199, 0]));

    img.save("fruit_test_image.png").unwrap();
    println!("Created fruit_test_image.png (800x600, 2 apples, 1 orange, 1 banana)");
}
