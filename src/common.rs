use lasso::Spur;

// de Bruijn level: zero is the outermost bound parameter.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Level(pub usize);

impl std::ops::Add<usize> for Level {
	type Output = Self;
	fn add(self, rhs: usize) -> Self::Output {
		let Self(level) = self;
		Self(level + rhs)
	}
}

impl std::ops::AddAssign<usize> for Level {
	fn add_assign(&mut self, rhs: usize) { self.0 += rhs; }
}

pub type Name = Spur;
pub type Label = Option<Name>;

/// A half-open byte range into the source text.
pub type Range = (usize, usize);

#[derive(Clone, PartialEq, Debug)]
pub struct Binder<P, T> {
	pub parameter: P,
	pub body: T,
}

impl<P, T> Binder<P, T> {
	pub fn new(parameter: P, body: T) -> Self { Self { parameter, body } }
}

pub fn bind<P, T>(parameter: P, body: impl Into<T>) -> Binder<P, T> { Binder::new(parameter, body.into()) }

impl<P, A> Binder<P, A> {
	pub fn map<B>(self, f: impl FnOnce(A) -> B) -> Binder<P, B> {
		Binder { parameter: self.parameter, body: f(self.body) }
	}
}

#[derive(Clone, Debug)]
pub struct Closure<E, T> {
	pub environment: E,
	pub parameter: Label,
	pub body: T,
}

impl<E, T> Closure<E, T> {
	pub fn new(environment: E, parameter: Label, body: T) -> Self { Self { environment, parameter, body } }
}

macro_rules! bx {
	($x:expr) => {
		::std::boxed::Box::new($x)
	};
}

pub(crate) use bx;

macro_rules! rc {
	($x:expr) => {
		::std::rc::Rc::new($x)
	};
}

pub(crate) use rc;
