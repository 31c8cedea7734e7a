use super::build::Point3;

/// Camera orientation for the 3D scatter, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewAngles {
    /// Rotation about the vertical (z) axis.
    pub yaw: f64,
    /// Elevation of the camera above the x-y plane.
    pub pitch: f64,
}

impl Default for ViewAngles {
    fn default() -> Self {
        Self {
            yaw: 35.0,
            pitch: 25.0,
        }
    }
}

/// Per-axis linear map from data range onto `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Bounds {
    pub fn of<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut min = [f64::INFINITY; 3];
        let mut max = [f64::NEG_INFINITY; 3];
        for p in points {
            for (axis, v) in [p.x, p.y, p.z].into_iter().enumerate() {
                min[axis] = min[axis].min(v);
                max[axis] = max[axis].max(v);
            }
        }
        for axis in 0..3 {
            if !min[axis].is_finite() || !max[axis].is_finite() {
                (min[axis], max[axis]) = (0.0, 1.0);
            }
        }
        Bounds { min, max }
    }

    pub fn normalize(&self, p: &Point3) -> [f64; 3] {
        let mut out = [0.0; 3];
        for (axis, v) in [p.x, p.y, p.z].into_iter().enumerate() {
            let span = self.max[axis] - self.min[axis];
            out[axis] = if span > 0.0 {
                2.0 * (v - self.min[axis]) / span - 1.0
            } else {
                0.0
            };
        }
        out
    }
}

/// A point on screen plus its distance along the view direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub screen: [f64; 2],
    pub depth: f64,
}

/// Orthographic projection of a normalized point: yaw about z, then
/// pitch about the screen's horizontal axis. Larger depth is further away.
pub fn project(p: [f64; 3], view: ViewAngles) -> Projected {
    let (sy, cy) = view.yaw.to_radians().sin_cos();
    let (sp, cp) = view.pitch.to_radians().sin_cos();
    let [x, y, z] = p;

    let x1 = x * cy - y * sy;
    let y1 = x * sy + y * cy;

    let depth = y1 * cp + z * sp;
    let up = -y1 * sp + z * cp;

    Projected {
        screen: [x1, up],
        depth,
    }
}

/// The three axis segments from the cube's back-bottom-left corner.
pub fn axis_segments(view: ViewAngles) -> [[[f64; 2]; 2]; 3] {
    let origin = project([-1.0, -1.0, -1.0], view).screen;
    [
        [origin, project([1.0, -1.0, -1.0], view).screen],
        [origin, project([-1.0, 1.0, -1.0], view).screen],
        [origin, project([-1.0, -1.0, 1.0], view).screen],
    ]
}
