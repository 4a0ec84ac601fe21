use crate::log::tag::Tag;
use std::fmt::{Debug, Display, Formatter};

/// This struct converts a tuple of tags to a vector of tags.
/// It supports tuples of length 0 through 6.
#[derive(Clone, Eq, PartialEq)]
pub struct TagList(pub Vec<Tag>);
impl TagList {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, index: usize, tag: Tag) {
        self.0.insert(index, tag);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Tag> {
        self.0.iter()
    }
}
impl Default for TagList {
    fn default() -> Self {
        Self::new()
    }
}
impl Display for TagList {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        if let Some(tag) = self.0.first() {
            write!(f, "{:?}:{}", tag.name, tag.value)?;
        }
        for tag in self.0.iter().skip(1) {
            write!(f, ",{:?}:{}", tag.name, tag.value)?;
        }
        Ok(())
    }
}
impl Debug for TagList {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "TagList{{{self}}}")
    }
}
impl From<Vec<Tag>> for TagList {
    fn from(v: Vec<Tag>) -> Self {
        Self(v)
    }
}
impl<A: Into<Tag>> From<A> for TagList {
    fn from(a: A) -> Self {
        TagList(vec![a.into()])
    }
}
impl From<()> for TagList {
    fn from((): ()) -> Self {
        TagList(Vec::new())
    }
}
impl<A: Into<Tag>> From<(A,)> for TagList {
    fn from((a,): (A,)) -> Self {
        TagList(vec![a.into()])
    }
}
impl<A: Into<Tag>, B: Into<Tag>> From<(A, B)> for TagList {
    fn from((a, b): (A, B)) -> Self {
        TagList(vec![a.into(), b.into()])
    }
}
impl<A: Into<Tag>, B: Into<Tag>, C: Into<Tag>> From<(A, B, C)> for TagList {
    fn from((a, b, c): (A, B, C)) -> Self {
        TagList(vec![a.into(), b.into(), c.into()])
    }
}
impl<A: Into<Tag>, B: Into<Tag>, C: Into<Tag>, D: Into<Tag>> From<(A, B, C, D)> for TagList {
    fn from((a, b, c, d): (A, B, C, D)) -> Self {
        TagList(vec![a.into(), b.into(), c.into(), d.into()])
    }
}
impl<A: Into<Tag>, B: Into<Tag>, C: Into<Tag>, D: Into<Tag>, E: Into<Tag>> From<(A, B, C, D, E)>
    for TagList
{
    fn from((a, b, c, d, e): (A, B, C, D, E)) -> Self {
        TagList(vec![a.into(), b.into(), c.into(), d.into(), e.into()])
    }
}
impl<A: Into<Tag>, B: Into<Tag>, C: Into<Tag>, D: Into<Tag>, E: Into<Tag>, F: Into<Tag>>
    From<(A, B, C, D, E, F)> for TagList
{
    fn from((a, b, c, d, e, f): (A, B, C, D, E, F)) -> Self {
        TagList(vec![
            a.into(),
            b.into(),
            c.into(),
            d.into(),
            e.into(),
            f.into(),
        ])
    }
}
