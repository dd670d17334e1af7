//! Colorize gridded data into a georeferenced texture.

use climate_common::{GeoRectangle, GriddedData};

use crate::colormap::Palette;
use crate::error::RenderResult;
use crate::sampler::{SampleableImage, SampledRaster};

/// Map every grid cell through `palette` and wrap the result as a raster layer.
///
/// - Values are normalized with the grid's explicit min/max, or the data range.
/// - Masked and non-finite cells are transparent.
/// - Rows are reordered so texture row 0 is the northernmost latitude, and
///   columns so texture column 0 is the westernmost longitude.
/// - Longitudes past 180 (a 0..360 axis) are wrapped into -180..180 before
///   ordering, so such grids land on the same hemisphere as the map.
/// - The rectangle spans the grid's (wrapped) axis coordinates, so grid
///   nodes land on texture pixel centers.
pub fn colorize_grid(
    grid: &GriddedData,
    palette: &Palette,
    opacity: f64,
) -> RenderResult<SampledRaster> {
    grid.validate()?;

    let rows = grid.rows();
    let cols = grid.cols();
    let (min_val, max_val) = grid.value_range().unwrap_or((0.0, 1.0));
    let range = max_val - min_val;

    let flip_rows = grid.lat_ascending();
    let lons = wrapped_longitudes(&grid.lon);
    if lons != grid.lon {
        tracing::debug!(cols, "Wrapping 0..360 longitude axis into -180..180");
    }
    let out_cols = column_order(&lons);

    let mut pixels = vec![0u8; rows * cols * 4];
    for row in 0..rows {
        let out_row = if flip_rows { rows - 1 - row } else { row };
        for col in 0..cols {
            let Some(value) = grid.value_at(row, col) else {
                continue;
            };
            let out_col = out_cols[col];

            let normalized = if range.abs() < f64::EPSILON {
                0.0
            } else {
                (value - min_val) / range
            };
            let color = palette.color_at(normalized);

            let idx = (out_row * cols + out_col) * 4;
            pixels[idx..idx + 4].copy_from_slice(&color.to_array());
        }
    }

    let lat_extent = grid.rectangle();
    let (west, east) = lons
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let rectangle = GeoRectangle::new(west, east, lat_extent.south, lat_extent.north);
    if !rectangle.is_valid() {
        tracing::warn!(
            rows,
            cols,
            "Grid spans no area; the colorized raster will not be sampled"
        );
    }

    let texture = SampleableImage::new(cols, rows, pixels)?;
    Ok(SampledRaster::new(texture, rectangle, opacity))
}

/// Map longitudes above 180 onto their -180..180 equivalent.
fn wrapped_longitudes(lon: &[f64]) -> Vec<f64> {
    lon.iter()
        .map(|&v| if v > 180.0 { v - 360.0 } else { v })
        .collect()
}

/// For each source column, the texture column it lands in (west to east).
fn column_order(lons: &[f64]) -> Vec<usize> {
    let mut by_lon: Vec<usize> = (0..lons.len()).collect();
    by_lon.sort_by(|&a, &b| lons[a].total_cmp(&lons[b]));

    let mut out = vec![0; lons.len()];
    for (texture_col, &source_col) in by_lon.iter().enumerate() {
        out[source_col] = texture_col;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::colormap::ColorStop;

    fn black_white() -> Palette {
        Palette::from_stops(
            "bw",
            vec![
                ColorStop::new(0.0, Color::opaque(0, 0, 0)),
                ColorStop::new(1.0, Color::opaque(255, 255, 255)),
            ],
        )
    }

    #[test]
    fn test_rows_are_ordered_north_first() {
        // Row 0 is south (lat -10), so it must end up at the bottom of the texture.
        let grid =
            GriddedData::new(vec![-10.0, 10.0], vec![-10.0, 10.0], vec![1.0, 2.0, 3.0, 4.0])
                .unwrap();
        let raster = colorize_grid(&grid, &black_white(), 1.0).unwrap();
        let tex = &raster.texture;

        assert_eq!(tex.pixel(0, 1), Color::opaque(0, 0, 0)); // value 1 at south-west
        assert_eq!(tex.pixel(1, 0), Color::opaque(255, 255, 255)); // value 4 at north-east
        assert_eq!(tex.pixel(0, 0), Color::opaque(170, 170, 170)); // value 3 at north-west
        assert_eq!(raster.rectangle.west, -10.0);
        assert_eq!(raster.rectangle.north, 10.0);
    }

    #[test]
    fn test_descending_longitude_is_flipped() {
        let grid = GriddedData::new(vec![0.0, 1.0], vec![10.0, -10.0], vec![1.0, 2.0, 1.0, 2.0])
            .unwrap();
        let raster = colorize_grid(&grid, &black_white(), 1.0).unwrap();
        // Value 2 sits at lon -10, the western edge.
        assert_eq!(raster.texture.pixel(0, 0), Color::opaque(255, 255, 255));
    }

    #[test]
    fn test_zero_to_360_longitude_is_wrapped() {
        // Column 3 (lon 270) is lon -90, the western edge after wrapping.
        let grid = GriddedData::new(
            vec![0.0, 1.0],
            vec![0.0, 90.0, 180.0, 270.0],
            vec![1.0, 2.0, 3.0, 4.0, 1.0, 2.0, 3.0, 4.0],
        )
        .unwrap();
        let raster = colorize_grid(&grid, &black_white(), 1.0).unwrap();

        assert_eq!(raster.rectangle.west, -90.0);
        assert_eq!(raster.rectangle.east, 180.0);
        assert_eq!(raster.texture.pixel(0, 0), Color::opaque(255, 255, 255));
        assert_eq!(raster.texture.pixel(1, 0), Color::opaque(0, 0, 0));
        assert_eq!(raster.texture.pixel(3, 1), Color::opaque(170, 170, 170));
    }

    #[test]
    fn test_masked_cells_are_transparent() {
        let grid = GriddedData::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![1.0, 2.0, 3.0, 4.0])
            .unwrap()
            .with_mask(vec![1, 1, 1, 0])
            .unwrap();
        let raster = colorize_grid(&grid, &black_white(), 0.5).unwrap();
        // Cell (row 1, col 1) is north-east after the flip.
        assert_eq!(raster.texture.pixel(1, 0), Color::transparent());
        assert_eq!(raster.opacity, 0.5);
    }

    #[test]
    fn test_constant_field_uses_first_color() {
        let grid = GriddedData::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![5.0; 4]).unwrap();
        let raster = colorize_grid(&grid, &black_white(), 1.0).unwrap();
        assert_eq!(raster.texture.pixel(1, 1), Color::opaque(0, 0, 0));
    }
}
