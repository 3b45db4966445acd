use crate::config::AreaMethod;
use crate::models::Contour;

/// Estimated enclosed area of a contour, in squared pixels
pub fn estimated_area(contour: &Contour, method: AreaMethod) -> f64 {
    match method {
        AreaMethod::Isoperimetric => contour.isoperimetric_area(),
        AreaMethod::Polygon => contour.polygon_area(),
    }
}

/// Count contours whose estimated area strictly exceeds `area_threshold`
pub fn count_fruit_contours(
    contours: &[Contour],
    area_threshold: f64,
    method: AreaMethod,
) -> u32 {
    contours
        .iter()
        .filter(|c| estimated_area(c, method) > area_threshold)
        .count() as u32
}
