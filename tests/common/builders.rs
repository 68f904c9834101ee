//! Entity builders shared by the round-trip suites.
//!
//! `all_entities()` yields one instance of every supported kind with
//! distinctive field values, so a suite that loses or mangles a kind
//! fails loudly.  Values stay on dyadic fractions where exact equality
//! is asserted after a text cycle.

#![allow(dead_code)]

use cadrw::entities::*;
use cadrw::types::Coord;
use cadrw::Entity;

pub fn point() -> Entity {
    let mut e = Point::new(Coord::new(1.5, 2.5, 0.0));
    e.thickness = 0.25;
    Entity::Point(e)
}

pub fn line() -> Entity {
    Entity::Line(Line::new(Coord::new(0.0, 0.0, 0.0), Coord::new(10.0, 5.0, 0.0)))
}

pub fn ray() -> Entity {
    Entity::Ray(Ray::new(Coord::new(1.0, 1.0, 0.0), Coord::new(0.0, 1.0, 0.0)))
}

pub fn xline() -> Entity {
    Entity::XLine(XLine::new(Coord::new(2.0, 2.0, 0.0), Coord::new(1.0, 0.0, 0.0)))
}

pub fn arc() -> Entity {
    Entity::Arc(Arc::new(Coord::new(5.0, 5.0, 0.0), 2.5, 0.5, 1.5))
}

pub fn circle() -> Entity {
    Entity::Circle(Circle::new(Coord::new(3.0, 4.0, 0.0), 6.25))
}

pub fn ellipse() -> Entity {
    Entity::Ellipse(Ellipse::new(
        Coord::new(0.0, 0.0, 0.0),
        Coord::new(4.0, 0.0, 0.0),
        0.5,
    ))
}

pub fn trace() -> Entity {
    Entity::Trace(Trace::new([
        Coord::new(0.0, 0.0, 0.0),
        Coord::new(1.0, 0.0, 0.0),
        Coord::new(0.0, 1.0, 0.0),
        Coord::new(1.0, 1.0, 0.0),
    ]))
}

pub fn solid() -> Entity {
    Entity::Solid(Solid::new([
        Coord::new(2.0, 0.0, 0.0),
        Coord::new(3.0, 0.0, 0.0),
        Coord::new(2.0, 1.0, 0.0),
        Coord::new(3.0, 1.0, 0.0),
    ]))
}

pub fn face3d() -> Entity {
    Entity::Face3D(Face3D::new([
        Coord::new(0.0, 0.0, 0.0),
        Coord::new(1.0, 0.0, 0.0),
        Coord::new(1.0, 1.0, 1.0),
        Coord::new(0.0, 1.0, 1.0),
    ]))
}

pub fn polyline() -> Entity {
    Entity::Polyline(Polyline::new(vec![
        Vertex::from_coords(0.0, 0.0, 0.0),
        Vertex::with_bulge(Coord::new(4.0, 0.0, 0.0), 0.5),
        Vertex::from_coords(4.0, 4.0, 0.0),
    ]))
}

pub fn polyline_3d() -> Entity {
    Entity::Polyline(Polyline::new_3d(vec![
        Vertex::from_coords(0.0, 0.0, 0.0),
        Vertex::from_coords(1.0, 1.0, 1.0),
        Vertex::from_coords(2.0, 0.0, 2.0),
    ]))
}

pub fn lwpolyline() -> Entity {
    let mut e = LwPolyline::new(vec![
        LwVertex::from_coords(0.0, 0.0),
        LwVertex::with_bulge(Coord::new(5.0, 0.0, 0.0), 0.25),
        LwVertex::from_coords(5.0, 5.0),
    ]);
    e.const_width = 0.125;
    Entity::LwPolyline(e)
}

pub fn spline() -> Entity {
    Entity::Spline(Spline::new(
        3,
        vec![
            Coord::new(0.0, 0.0, 0.0),
            Coord::new(1.0, 2.0, 0.0),
            Coord::new(3.0, 2.0, 0.0),
            Coord::new(4.0, 0.0, 0.0),
        ],
        vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
    ))
}

pub fn hatch() -> Entity {
    Entity::Hatch(Hatch::solid_fill(vec![HatchLoop::rectangle(
        Coord::new(0.0, 0.0, 0.0),
        Coord::new(2.0, 1.0, 0.0),
    )]))
}

pub fn insert() -> Entity {
    Entity::Insert(Insert::new("DOOR", Coord::new(7.0, 8.0, 0.0)).with_scale(2.0))
}

pub fn block_pair() -> (Entity, Entity) {
    let mut b = Block::new("DOOR");
    b.base_point = Coord::new(0.5, 0.5, 0.0);
    (Entity::Block(b), Entity::BlockEnd(BlockEnd::new()))
}

pub fn text() -> Entity {
    Entity::Text(Text::new("HELLO", Coord::new(1.0, 1.0, 0.0), 0.5))
}

pub fn mtext() -> Entity {
    let mut e = MText::new("First line\\PSecond line", Coord::new(2.0, 9.0, 0.0), 0.25);
    e.rect_width = 6.0;
    Entity::MText(e)
}

pub fn dimension_linear() -> Entity {
    let mut d = DimLinear::default();
    d.data.def_point1 = Coord::new(0.0, 0.0, 0.0);
    d.data.def_point2 = Coord::new(8.0, 0.0, 0.0);
    d.data.definition_point = Coord::new(4.0, 2.0, 0.0);
    d.data.text_midpoint = Coord::new(4.0, 2.25, 0.0);
    Entity::Dimension(Dimension::Linear(d))
}

pub fn dimension_radial() -> Entity {
    let mut d = DimRadial::default();
    d.set_center(Coord::new(5.0, 5.0, 0.0));
    d.set_circle_point(Coord::new(8.0, 9.0, 0.0));
    d.data.leader_length = 1.25;
    Entity::Dimension(Dimension::Radial(d))
}

pub fn dimension_arc() -> Entity {
    let mut d = DimArc::default();
    d.data.vertex_point = Coord::new(3.0, 3.0, 0.0);
    d.start_angle = 0.25;
    d.end_angle = 1.75;
    Entity::Dimension(Dimension::Arc(d))
}

pub fn leader() -> Entity {
    Entity::Leader(Leader::new(vec![
        Coord::new(0.0, 0.0, 0.0),
        Coord::new(2.0, 2.0, 0.0),
        Coord::new(4.0, 2.0, 0.0),
    ]))
}

pub fn image() -> Entity {
    let mut e = Image::new(Coord::new(0.0, 0.0, 0.0), 640.0, 480.0);
    e.brightness = 60;
    Entity::Image(e)
}

pub fn viewport() -> Entity {
    let mut e = Viewport::new(Coord::new(100.0, 100.0, 0.0), 200.0, 150.0);
    e.view_height = 75.0;
    Entity::Viewport(e)
}

/// One of every kind, block pair included, in a stable order.
pub fn all_entities() -> Vec<Entity> {
    let (block, block_end) = block_pair();
    vec![
        point(),
        line(),
        ray(),
        xline(),
        arc(),
        circle(),
        ellipse(),
        trace(),
        solid(),
        face3d(),
        polyline(),
        polyline_3d(),
        lwpolyline(),
        spline(),
        hatch(),
        block,
        insert(),
        block_end,
        text(),
        mtext(),
        dimension_linear(),
        dimension_radial(),
        dimension_arc(),
        leader(),
        viewport(),
        image(),
    ]
}

/// The kinds the oldest text dialect already had.
pub fn classic_entities() -> Vec<Entity> {
    vec![
        point(),
        line(),
        arc(),
        circle(),
        trace(),
        solid(),
        face3d(),
        polyline(),
        text(),
        insert(),
    ]
}
