//! The four food stations' dishes and a compact per-customer dish set.

use std::fmt;

/// Number of food stations (and dishes).
pub const DISH_COUNT: usize = 4;

/// A dish served by one food station.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Dish {
    Drinks,
    Appetizer,
    MainCourse,
    Dessert,
}

impl Dish {
    /// All dishes in station-index order.
    pub const ALL: [Dish; DISH_COUNT] = [
        Dish::Drinks,
        Dish::Appetizer,
        Dish::MainCourse,
        Dish::Dessert,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Dish> {
        Dish::ALL.get(i).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dish::Drinks => "drinks",
            Dish::Appetizer => "appetizer",
            Dish::MainCourse => "main_course",
            Dish::Dessert => "dessert",
        }
    }
}

impl fmt::Display for Dish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of dishes stored as one flag per station.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DishSet([bool; DISH_COUNT]);

impl DishSet {
    pub const EMPTY: DishSet = DishSet([false; DISH_COUNT]);
    pub const FULL: DishSet = DishSet([true; DISH_COUNT]);

    pub fn from_flags(flags: [bool; DISH_COUNT]) -> Self {
        DishSet(flags)
    }

    pub fn of(dishes: &[Dish]) -> Self {
        let mut set = DishSet::EMPTY;
        for &d in dishes {
            set.insert(d);
        }
        set
    }

    #[inline]
    pub fn flags(&self) -> [bool; DISH_COUNT] {
        self.0
    }

    #[inline]
    pub fn contains(&self, dish: Dish) -> bool {
        self.0[dish.index()]
    }

    /// Add `dish`; returns `false` if it was already present.
    pub fn insert(&mut self, dish: Dish) -> bool {
        let was = self.0[dish.index()];
        self.0[dish.index()] = true;
        !was
    }

    pub fn len(&self) -> usize {
        self.0.iter().filter(|&&f| f).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.0.iter().any(|&f| f)
    }

    /// Dishes in the set, in station-index order.
    pub fn iter(&self) -> impl Iterator<Item = Dish> + '_ {
        Dish::ALL.into_iter().filter(|&d| self.contains(d))
    }

    /// Dishes in `self` but not in `other`, in station-index order.
    pub fn difference(&self, other: &DishSet) -> Vec<Dish> {
        self.iter().filter(|&d| !other.contains(d)).collect()
    }
}
