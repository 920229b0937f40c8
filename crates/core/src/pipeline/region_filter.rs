use crate::shared::region::Region;

/// Drops detections smaller than `min_size` pixels on either side.
///
/// Distant faces at snapshot resolution are mostly false positives; a
/// `min_size` of 0 keeps everything.
pub fn filter_regions(regions: &[Region], min_size: u32) -> Vec<Region> {
    let min = min_size as i32;
    regions
        .iter()
        .filter(|r| r.width >= min && r.height >= min)
        .cloned()
        .collect()
}
