//! Adaptive clustering of positioned objects into rows or columns.
//!
//! Objects whose extents intercept along one axis (after expanding by a
//! threshold) are merged into a [`Group`]. The merge loop is order
//! sensitive, so inputs are sorted by their extent before merging and the
//! result is deterministic for a given set of objects.

use ordered_float::OrderedFloat;
use tracing::trace;

use crate::geometry::{self, Axis, BBox, Positioned};

/// Fraction of the average object extent used when no threshold is given.
pub const DEFAULT_THRESHOLD_PROPORTION: f64 = 0.3;

/// Signature shared by [`geometry::intercepts`], [`geometry::contains_center`]
/// and [`geometry::contains`].
pub type RangeCheck = fn(f64, f64, f64, f64, f64) -> bool;

/// A cluster of objects sharing one bounding envelope.
///
/// The envelope only grows as objects are added.
#[derive(Clone, Debug)]
pub struct Group<T> {
    objects: Vec<T>,
    bbox: BBox,
    threshold: f64,
}

impl<T: Positioned> Group<T> {
    pub fn new(threshold: f64) -> Self {
        Self {
            objects: Vec::new(),
            bbox: BBox::EMPTY,
            threshold,
        }
    }

    pub fn from_objects(objects: Vec<T>, threshold: f64) -> Self {
        let bbox = objects
            .iter()
            .fold(BBox::EMPTY, |acc, obj| acc.union(&obj.bbox()));
        Self {
            objects,
            bbox,
            threshold,
        }
    }

    pub fn add(&mut self, obj: T) {
        self.bbox = self.bbox.union(&obj.bbox());
        self.objects.push(obj);
    }

    /// Move every member of `other` into this group.
    pub fn absorb(&mut self, other: Group<T>) {
        self.bbox = self.bbox.union(&other.bbox);
        self.objects.extend(other.objects);
    }

    pub fn objects(&self) -> &[T] {
        &self.objects
    }

    pub fn into_objects(self) -> Vec<T> {
        self.objects
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// `(min, max)` of the envelope along `axis`.
    pub fn interval(&self, axis: Axis) -> (f64, f64) {
        self.bbox.span(axis)
    }

    /// Whether `obj` intercepts the group's envelope on `axis`.
    pub fn intercepts<O: Positioned>(&self, axis: Axis, obj: &O) -> bool {
        self.check(axis, obj, geometry::intercepts)
    }

    /// Whether the center of `obj` lies in the group's envelope on `axis`.
    pub fn contains_center<O: Positioned>(&self, axis: Axis, obj: &O) -> bool {
        self.check(axis, obj, geometry::contains_center)
    }

    /// Whether `obj` lies fully in the group's envelope on `axis`.
    pub fn contains<O: Positioned>(&self, axis: Axis, obj: &O) -> bool {
        self.check(axis, obj, geometry::contains)
    }

    fn check<O: Positioned>(&self, axis: Axis, obj: &O, check: RangeCheck) -> bool {
        let (d0, d1) = obj.bbox().span(axis);
        let (g0, g1) = self.interval(axis);
        check(d0, d1, g0, g1, self.threshold)
    }
}

impl<T: Positioned> Positioned for Group<T> {
    fn bbox(&self) -> BBox {
        self.bbox
    }
}

impl<'a, T> IntoIterator for &'a Group<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

/// Derive a grouping threshold from the objects' average extent on `axis`.
///
/// On y this is the average height; on x the average character width
/// (object width over character count, 0 for empty text). Returns 0 when
/// there are no objects.
pub fn define_threshold<T: Positioned>(axis: Axis, objects: &[T], proportion: f64) -> f64 {
    if objects.is_empty() {
        return 0.0;
    }
    let total: f64 = objects
        .iter()
        .map(|obj| {
            let bbox = obj.bbox();
            match axis {
                Axis::Y => bbox.height(),
                Axis::X => match obj.char_count() {
                    0 => 0.0,
                    chars => bbox.width() / chars as f64,
                },
            }
        })
        .sum();
    proportion * (total / objects.len() as f64)
}

fn span_key<T: Positioned>(obj: &T, axis: Axis) -> (OrderedFloat<f64>, OrderedFloat<f64>) {
    let (min, max) = obj.bbox().span(axis);
    (OrderedFloat(min), OrderedFloat(max))
}

/// Group objects intercepting each other along `axis`.
///
/// When `threshold` is `None` it is derived with [`define_threshold`].
pub fn group_objects<T: Positioned + Clone>(
    axis: Axis,
    objects: &[T],
    threshold: Option<f64>,
) -> Vec<Group<T>> {
    group_objects_with(axis, objects, threshold, geometry::intercepts)
}

/// Like [`group_objects`] with a custom merge predicate.
///
/// Groups are seeded one per object in `(min, max)` order on `axis`. For
/// each group `i`, the first later group `j` satisfying `check` is merged
/// into `i` and the scan restarts at `i`; `i` advances only once nothing
/// merges into it. Members of each returned group are ordered along the
/// other axis.
pub fn group_objects_with<T: Positioned + Clone>(
    axis: Axis,
    objects: &[T],
    threshold: Option<f64>,
    check: RangeCheck,
) -> Vec<Group<T>> {
    let threshold = threshold
        .unwrap_or_else(|| define_threshold(axis, objects, DEFAULT_THRESHOLD_PROPORTION));

    let mut seeds: Vec<T> = objects.to_vec();
    seeds.sort_by_key(|obj| span_key(obj, axis));
    let mut groups: Vec<Group<T>> = seeds
        .into_iter()
        .map(|obj| Group::from_objects(vec![obj], threshold))
        .collect();

    let mut i = 0;
    while i + 1 < groups.len() {
        let (min1, max1) = groups[i].interval(axis);
        let merge_with = (i + 1..groups.len()).find(|&j| {
            let (min2, max2) = groups[j].interval(axis);
            check(min1, max1, min2, max2, threshold)
        });
        match merge_with {
            Some(j) => {
                let other = groups.remove(j);
                groups[i].absorb(other);
            }
            None => i += 1,
        }
    }
    trace!(
        ?axis,
        threshold,
        objects = objects.len(),
        groups = groups.len(),
        "grouped objects"
    );

    let other = axis.other();
    groups
        .into_iter()
        .map(|group| {
            let mut members = group.into_objects();
            members.sort_by_key(|obj| span_key(obj, other));
            Group::from_objects(members, threshold)
        })
        .collect()
}
