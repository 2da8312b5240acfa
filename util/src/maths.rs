//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::{Float, PrimInt, Signed};

/// Limit a value to the range `[min, max]`.
///
/// The limits are applied in order, so if `min > max` the result is `min`. A NaN value gives
/// `min`.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T 
where
    T: Float
{
    if value.is_nan() {
        return *min
    }

    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Get the signed distance from `a` to `b` on a circle of `ticks` discrete steps.
///
/// Both points must be in `[0, ticks)`. The result is the shortest signed distance between them,
/// in the half-open range `(-ticks/2, ticks/2]`, so that adding it to `a` (modulo `ticks`) gives
/// `b`. When both arcs are the same length the positive one is returned.
pub fn get_tick_dist<T>(a: T, b: T, ticks: T) -> T
where
    T: PrimInt + Signed
{
    let half = ticks / (T::one() + T::one());

    let mut dist = b - a;

    if dist > half {
        dist = dist - ticks;
    }
    else if dist <= -half {
        dist = dist + ticks;
    }

    dist
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&500f64, &0f64, &90f64), 90f64);
        assert_eq!(clamp(&-20f64, &0f64, &90f64), 0f64);
        assert_eq!(clamp(&18.5f64, &0f64, &90f64), 18.5f64);
        assert_eq!(clamp(&f64::INFINITY, &0f64, &90f64), 90f64);
        assert_eq!(clamp(&f64::NEG_INFINITY, &0f64, &90f64), 0f64);
        assert_eq!(clamp(&f64::NAN, &0f64, &90f64), 0f64);
        assert_eq!(clamp(&f32::NAN, &-1f32, &1f32), -1f32);
    }

    #[test]
    fn test_get_tick_dist() {
        assert_eq!(get_tick_dist(250i32, 10, 256), 16);
        assert_eq!(get_tick_dist(10i32, 250, 256), -16);
        assert_eq!(get_tick_dist(90i32, 100, 256), 10);
        assert_eq!(get_tick_dist(0i32, 0, 256), 0);
        assert_eq!(get_tick_dist(0i32, 128, 256), 128);
        assert_eq!(get_tick_dist(128i32, 0, 256), 128);
        assert_eq!(get_tick_dist(255i32, 0, 256), 1);
        assert_eq!(get_tick_dist(0i32, 255, 256), -1);
    }

    #[test]
    fn test_get_tick_dist_is_shortest_arc() {
        const TICKS: i32 = 256;

        for a in 0..TICKS {
            for b in 0..TICKS {
                let dist = get_tick_dist(a, b, TICKS);

                // Always within (-N/2, N/2]
                assert!(dist > -TICKS / 2 && dist <= TICKS / 2, "{} -> {}: {}", a, b, dist);

                // Lands on the target
                assert_eq!((a + dist).rem_euclid(TICKS), b);

                // And is the shorter of the two arcs
                let fwd = (b - a).rem_euclid(TICKS);
                let bwd = (a - b).rem_euclid(TICKS);
                assert_eq!(dist.abs(), fwd.min(bwd));
            }
        }
    }
}
