#![cfg(feature = "serde")]

use approx::assert_relative_eq;
use tenspline::prelude::{BSpline, ControlGrid, KnotVector, Nurbs, SplineText};

fn saddle() -> anyhow::Result<Nurbs<f64>> {
    let points = (0..9)
        .map(|i| {
            let (x, y) = ((i % 3) as f64, (i / 3) as f64);
            vec![x, y, (x - 1.) * (y - 1.)]
        })
        .collect();
    let spline = Nurbs::try_new(
        vec![vec![0., 0., 0., 1., 1., 1.], vec![0., 0., 0., 1., 1., 1.]],
        vec![2, 2],
        points,
        vec![1., 2., 1., 0.5, 1., 0.5, 1., 2., 1.],
    )?;
    Ok(spline)
}

#[test]
fn spline_round_trips_through_json() -> anyhow::Result<()> {
    let spline = saddle()?;
    let json = serde_json::to_string_pretty(&spline)?;
    let read: Nurbs<f64> = serde_json::from_str(&json)?;
    assert!(read.is_equal(&spline, 1e-14));
    assert_eq!(read.to_string(), "<Nurbs>");
    Ok(())
}

#[test]
fn text_form_round_trips_through_json() -> anyhow::Result<()> {
    let spline = saddle()?;
    let json = serde_json::to_string(&spline.write())?;
    assert!(json.contains("\"degrees\":[\"2\",\"2\"]"));
    let text: SplineText = serde_json::from_str(&json)?;
    let read = Nurbs::<f64>::read(&text)?;
    assert!(read.is_equal(&spline, 1e-14));
    assert_relative_eq!(read.point_at(&[0.3, 0.7])?, spline.point_at(&[0.3, 0.7])?, epsilon = 1e-14);
    Ok(())
}

fn polyline() -> anyhow::Result<BSpline<f64>> {
    let spline = BSpline::try_new(
        vec![vec![0., 0., 0.5, 1., 1.]],
        vec![1],
        vec![vec![0.], vec![0.75], vec![1.]],
    )?;
    Ok(spline)
}

#[test]
fn serialized_form_has_no_strides() -> anyhow::Result<()> {
    let json = serde_json::to_string(&polyline()?)?;
    assert_eq!(
        json,
        r#"{"knot_vectors":[[0.0,0.0,0.5,1.0,1.0]],"degrees":[1],"grid":{"shape":[3],"coordinate_dimension":1,"coordinates":[0.0,0.75,1.0]}}"#
    );
    Ok(())
}

#[test]
fn tampered_json_is_rejected() -> anyhow::Result<()> {
    let json = serde_json::to_string(&polyline()?)?;
    let tampered = [
        // one coordinate short of the shape
        json.replace("[0.0,0.75,1.0]", "[0.0,0.75]"),
        // a shape that disagrees with the knots
        json.replace(
            r#""shape":[3],"coordinate_dimension":1,"coordinates":[0.0,0.75,1.0]"#,
            r#""shape":[4],"coordinate_dimension":1,"coordinates":[0.0,0.75,1.0,1.0]"#,
        ),
        // unclamped and decreasing knots
        json.replace("[0.0,0.0,0.5,1.0,1.0]", "[0.0,0.25,0.5,1.0,1.0]"),
        json.replace("[0.0,0.0,0.5,1.0,1.0]", "[0.0,0.0,1.5,1.0,1.0]"),
        json.replace(r#""degrees":[1]"#, r#""degrees":[2]"#),
        json.replace(r#""coordinate_dimension":1,"#, r#""strides":[1],"coordinate_dimension":1,"#),
    ];
    for text in tampered.iter() {
        assert_ne!(text, &json);
        assert!(serde_json::from_str::<BSpline<f64>>(text).is_err(), "{}", text);
    }
    Ok(())
}

#[test]
fn nurbs_json_needs_positive_weights() -> anyhow::Result<()> {
    // a B-spline with one coordinate per point has no weight to divide by
    let json = serde_json::to_string(&polyline()?)?;
    assert!(serde_json::from_str::<Nurbs<f64>>(&json).is_err());

    let json = serde_json::to_string(&BSpline::try_new(
        vec![vec![0., 0., 1., 1.]],
        vec![1],
        vec![vec![1., 1.], vec![2., -1.]],
    )?)?;
    assert!(serde_json::from_str::<Nurbs<f64>>(&json).is_err());
    let read: BSpline<f64> = serde_json::from_str(&json)?;
    assert_eq!(read.control_points()[1].as_slice(), &[2., -1.]);
    Ok(())
}

#[test]
fn parts_validate_on_their_own() {
    assert!(serde_json::from_str::<KnotVector<f64>>("[0.0,0.5,1.0]").is_ok());
    assert!(serde_json::from_str::<KnotVector<f64>>("[1.0,0.5]").is_err());
    let grid: ControlGrid<f64> =
        serde_json::from_str(r#"{"shape":[2,1],"coordinate_dimension":2,"coordinates":[0,1,2,3]}"#)
            .unwrap();
    assert_eq!(grid.shape(), &[2, 1]);
    assert!(serde_json::from_str::<ControlGrid<f64>>(
        r#"{"shape":[2,2],"coordinate_dimension":2,"coordinates":[0,1,2,3]}"#
    )
    .is_err());
}
