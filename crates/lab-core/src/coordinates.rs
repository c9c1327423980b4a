//! Coordinate systems and ordered transform chains.
//!
//! A coordinate is a `Vec<Transform>`: steps applied in sequence, each tagged
//! by `object_type`. All steps of one coordinate share a dimensionality.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{AngleUnit, SizeUnit};
use crate::errors::ValidationError;
use crate::validate::{Validate, check_not_blank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum AxisName {
    X,
    Y,
    Z,
    #[serde(rename = "AP")]
    Ap,
    #[serde(rename = "ML")]
    Ml,
    #[serde(rename = "SI")]
    Si,
    Depth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    LeftToRight,
    RightToLeft,
    AnteriorToPosterior,
    PosteriorToAnterior,
    InferiorToSuperior,
    SuperiorToInferior,
    TopToBottom,
    BottomToTop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Bregma,
    Lambda,
    Origin,
    Tip,
    FrontCenter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Axis {
    pub name: AxisName,
    pub direction: Direction,
}

/// Named frame that positions in the same document refer to by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CoordinateSystem {
    pub name: String,
    pub origin: Origin,
    pub axes: Vec<Axis>,
    pub axis_unit: SizeUnit,
}

impl CoordinateSystem {
    #[must_use]
    pub const fn dimensions(&self) -> usize {
        self.axes.len()
    }
}

impl Validate for CoordinateSystem {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("CoordinateSystem", "name", &self.name)?;
        if self.axes.is_empty() {
            return Err(ValidationError::field(
                "CoordinateSystem",
                "axes",
                &self.axes,
                "must declare at least one axis",
            ));
        }
        for (index, axis) in self.axes.iter().enumerate() {
            if self.axes[..index].iter().any(|seen| seen.name == axis.name) {
                return Err(ValidationError::field(
                    "CoordinateSystem",
                    format!("axes[{index}].name"),
                    axis.name,
                    "axis names must be unique",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Translation {
    pub translation: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Scale {
    pub scale: Vec<f64>,
}

/// Euler angles; one angle for 2D, three for 3D.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Rotation {
    pub angles: Vec<f64>,
    #[serde(default)]
    pub angles_unit: AngleUnit,
}

/// `n×n` linear or `n×(n+1)` homogeneous affine matrix, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Affine {
    pub affine_transform: Vec<Vec<f64>>,
}

/// One step of a coordinate transform chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "object_type")]
pub enum Transform {
    Translation(Translation),
    Scale(Scale),
    Rotation(Rotation),
    Affine(Affine),
}

impl Transform {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Translation(_) => "Translation",
            Self::Scale(_) => "Scale",
            Self::Rotation(_) => "Rotation",
            Self::Affine(_) => "Affine",
        }
    }

    /// Spatial dimensionality of the step.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        match self {
            Self::Translation(t) => t.translation.len(),
            Self::Scale(s) => s.scale.len(),
            Self::Rotation(r) => {
                if r.angles.len() == 1 {
                    2
                } else {
                    r.angles.len()
                }
            }
            Self::Affine(a) => a.affine_transform.len(),
        }
    }
}

impl Validate for Transform {
    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Translation(t) if t.translation.is_empty() => Err(ValidationError::field(
                "Translation",
                "translation",
                &t.translation,
                "must not be empty",
            )),
            Self::Scale(s) if s.scale.is_empty() => Err(ValidationError::field(
                "Scale",
                "scale",
                &s.scale,
                "must not be empty",
            )),
            Self::Rotation(r) if !matches!(r.angles.len(), 1 | 3) => Err(ValidationError::field(
                "Rotation",
                "angles",
                &r.angles,
                "must hold 1 (2D) or 3 (3D) angles",
            )),
            Self::Affine(a) => {
                let rows = a.affine_transform.len();
                if rows == 0 {
                    return Err(ValidationError::field(
                        "Affine",
                        "affine_transform",
                        &a.affine_transform,
                        "must not be empty",
                    ));
                }
                let cols = a.affine_transform[0].len();
                if a.affine_transform.iter().any(|row| row.len() != cols)
                    || (cols != rows && cols != rows + 1)
                {
                    return Err(ValidationError::field(
                        "Affine",
                        "affine_transform",
                        &a.affine_transform,
                        "must be an n×n or n×(n+1) matrix",
                    ));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Validate a coordinate (a transform chain) stored under `field`.
///
/// # Errors
///
/// Returns the first invalid step, or `FieldConstraint` when the steps
/// disagree on dimensionality.
pub fn validate_coordinate(
    record: &'static str,
    field: &str,
    coordinate: &[Transform],
) -> Result<(), ValidationError> {
    for (index, step) in coordinate.iter().enumerate() {
        step.validate()
            .map_err(|err| err.nested(&format!("{field}[{index}]")))?;
    }
    if let Some(first) = coordinate.first() {
        let dims = first.dimensions();
        if let Some(step) = coordinate.iter().find(|step| step.dimensions() != dims) {
            return Err(ValidationError::field(
                record,
                field,
                step.kind(),
                format!(
                    "all transforms must share dimensionality {dims}, found {}",
                    step.dimensions()
                ),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bregma_ari() -> CoordinateSystem {
        CoordinateSystem {
            name: "BREGMA_ARI".into(),
            origin: Origin::Bregma,
            axes: vec![
                Axis {
                    name: AxisName::Ap,
                    direction: Direction::PosteriorToAnterior,
                },
                Axis {
                    name: AxisName::Ml,
                    direction: Direction::LeftToRight,
                },
                Axis {
                    name: AxisName::Si,
                    direction: Direction::SuperiorToInferior,
                },
            ],
            axis_unit: SizeUnit::Millimeter,
        }
    }

    #[test]
    fn transform_tag_is_object_type() {
        let step = Transform::Translation(Translation {
            translation: vec![1.5, -2.0, 0.5],
        });
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["object_type"], "Translation");
        let back: Transform = serde_json::from_value(json).unwrap();
        assert_eq!(back, step);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let json = serde_json::json!({"object_type": "Shear", "shear": [1.0]});
        assert!(serde_json::from_value::<Transform>(json).is_err());
    }

    #[test]
    fn coordinate_system_rejects_duplicate_axes() {
        let mut system = bregma_ari();
        assert!(system.validate().is_ok());
        system.axes[2].name = AxisName::Ap;
        let err = system.validate().unwrap_err();
        assert_eq!(err.fields(), vec!["axes[2].name"]);
    }

    #[test]
    fn affine_shape_is_checked() {
        let homogeneous = Transform::Affine(Affine {
            affine_transform: vec![vec![1.0, 0.0, 2.0], vec![0.0, 1.0, 3.0]],
        });
        assert!(homogeneous.validate().is_ok());
        assert_eq!(homogeneous.dimensions(), 2);

        let ragged = Transform::Affine(Affine {
            affine_transform: vec![vec![1.0, 0.0], vec![0.0]],
        });
        assert!(ragged.validate().is_err());
    }

    #[test]
    fn mixed_dimensionality_is_rejected() {
        let coordinate = vec![
            Transform::Translation(Translation {
                translation: vec![1.0, 2.0, 3.0],
            }),
            Transform::Rotation(Rotation {
                angles: vec![45.0],
                angles_unit: AngleUnit::Degrees,
            }),
        ];
        let err = validate_coordinate("Craniotomy", "position", &coordinate).unwrap_err();
        assert!(err.to_string().contains("dimensionality 3"));
    }

    #[test]
    fn step_errors_are_rooted_under_the_field() {
        let coordinate = vec![Transform::Scale(Scale { scale: Vec::new() })];
        let err = validate_coordinate("MriScan", "voxel_sizes", &coordinate).unwrap_err();
        assert_eq!(err.fields(), vec!["voxel_sizes[0].scale"]);
    }

    #[rstest::rstest]
    #[case(1, Some(2))]
    #[case(3, Some(3))]
    #[case(0, None)]
    #[case(2, None)]
    #[case(9, None)]
    fn rotation_holds_one_or_three_angles(#[case] count: usize, #[case] dims: Option<usize>) {
        let step = Transform::Rotation(Rotation {
            angles: vec![15.0; count],
            angles_unit: AngleUnit::Degrees,
        });
        match dims {
            Some(dims) => {
                assert!(step.validate().is_ok());
                assert_eq!(step.dimensions(), dims);
            }
            None => {
                let err = step.validate().unwrap_err();
                assert!(err.to_string().contains("1 (2D) or 3 (3D)"), "{err}");
            }
        }
    }
}
