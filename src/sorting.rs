use image::Pixel;

/// Sum of the red, green and blue channels. Alpha does not contribute.
#[inline]
pub fn brightness<P>(pixel: &P) -> u32
where
    P: Pixel<Subpixel = u8>,
{
    pixel.to_rgb().channels().iter().map(|c| *c as u32).sum()
}

/// Sorts `pixels` ascending by [`brightness`]. Equal keys keep their order.
pub fn sort_by_brightness<P>(pixels: &mut [P])
where
    P: Pixel<Subpixel = u8>,
{
    pixels.sort_by_key(brightness);
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn alpha_is_ignored() {
        assert_eq!(brightness(&Rgba([100u8, 100, 100, 0])), 300);
        assert_eq!(brightness(&Rgba([100u8, 100, 100, 255])), 300);
        assert_eq!(brightness(&Rgba([255u8, 255, 255, 255])), 765);
    }

    #[test]
    fn sorts_ascending_and_keeps_ties_in_place() {
        let mut pixels = vec![
            Rgba([200u8, 100, 0, 255]),
            Rgba([10, 20, 30, 255]),
            Rgba([0, 100, 200, 7]),
            Rgba([0, 0, 0, 0]),
        ];
        sort_by_brightness(&mut pixels);
        assert_eq!(
            pixels,
            vec![
                Rgba([0, 0, 0, 0]),
                Rgba([10, 20, 30, 255]),
                Rgba([200, 100, 0, 255]),
                Rgba([0, 100, 200, 7]),
            ]
        );
    }
}
