//! 与 `geo` 几何类型之间的转换
//!
//! 只支持二维矩形；几何体以其边界框进入索引。

use crate::rectangle::Rectangle;
use geo::{BoundingRect, Coord, Geometry, Point, Rect};

impl From<Coord<f64>> for Rectangle<2> {
    fn from(coord: Coord<f64>) -> Self {
        Rectangle::from_point([coord.x, coord.y])
    }
}

impl From<Point<f64>> for Rectangle<2> {
    fn from(point: Point<f64>) -> Self {
        point.0.into()
    }
}

impl From<Rect<f64>> for Rectangle<2> {
    fn from(rect: Rect<f64>) -> Self {
        // geo::Rect 构造时已经规范化了 min/max
        Rectangle::new([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
    }
}

impl Rectangle<2> {
    /// 从 geo::Geometry 计算边界框，空几何体返回 `None`
    pub fn from_geometry(geometry: &Geometry<f64>) -> Option<Self> {
        geometry.bounding_rect().map(Rectangle::from)
    }

    pub fn to_geo_rect(&self) -> Rect<f64> {
        Rect::new(
            Coord {
                x: self.min[0],
                y: self.min[1],
            },
            Coord {
                x: self.max[0],
                y: self.max[1],
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, MultiPoint, Polygon, coord};

    #[test]
    fn test_from_point_and_coord() {
        let rect: Rectangle = Point::new(1.5, -2.0).into();
        assert!(rect.is_point());
        assert_eq!(rect.min, [1.5, -2.0]);

        let rect: Rectangle = coord! { x: 3.0, y: 4.0 }.into();
        assert_eq!(rect, Rectangle::from_point([3.0, 4.0]));
    }

    #[test]
    fn test_from_geo_rect_normalizes() {
        let geo_rect = Rect::new(coord! { x: 10.0, y: 0.0 }, coord! { x: 0.0, y: 5.0 });
        let rect: Rectangle = geo_rect.into();
        assert_eq!(rect, Rectangle::new([0.0, 0.0], [10.0, 5.0]));
        assert_eq!(rect.to_geo_rect(), geo_rect);
    }

    #[test]
    fn test_from_geometry() {
        let polygon = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (4.0, 1.0), (2.0, 6.0), (0.0, 0.0)]),
            vec![],
        );
        let rect = Rectangle::from_geometry(&Geometry::Polygon(polygon));
        assert_eq!(rect, Some(Rectangle::new([0.0, 0.0], [4.0, 6.0])));

        let point = Geometry::Point(Point::new(7.0, 8.0));
        assert_eq!(Rectangle::from_geometry(&point), Some(Rectangle::from_point([7.0, 8.0])));

        let empty = Geometry::MultiPoint(MultiPoint::<f64>(vec![]));
        assert_eq!(Rectangle::from_geometry(&empty), None);
    }
}
