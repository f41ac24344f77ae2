use thiserror::Error;
use tracing::debug;

use crate::{
	common::bx,
	frontend::{reflect::Reflect as _, reify::Reify as _, unify::Unifier},
	ir::{
		semantics::{MetaNeutral, ObjectTermValue},
		staged::StagedTerm,
		syntax::{MetaTerm, ObjectTerm},
	},
};

#[derive(Clone, Debug, Error)]
pub enum StageError {
	#[error("splice did not normalize to a quotation: {normal_form:?}")]
	NotAQuotation { normal_form: MetaTerm },
	#[error("hole reached staging")]
	Hole,
}

pub trait Stage {
	type Staged;
	/// Resolves every splice in an object program by evaluating it at compile time.
	fn stage(&self) -> Result<Self::Staged, StageError>;
}

impl Stage for ObjectTerm {
	type Staged = StagedTerm;
	fn stage(&self) -> Result<Self::Staged, StageError> {
		let staged = self.reflect().stage()?;
		debug!("staged program");
		Ok(staged)
	}
}

impl Stage for ObjectTermValue {
	type Staged = StagedTerm;
	fn stage(&self) -> Result<Self::Staged, StageError> {
		use ObjectTermValue as V;
		use StagedTerm as S;
		let all = |elements: &[ObjectTermValue]| -> Result<Vec<StagedTerm>, StageError> {
			elements.iter().map(Stage::stage).collect()
		};
		Ok(match self {
			V::ByteTag(n) => S::ByteTag(*n),
			V::ShortTag(n) => S::ShortTag(*n),
			V::IntTag(n) => S::IntTag(*n),
			V::LongTag(n) => S::LongTag(*n),
			V::FloatTag(n) => S::FloatTag(*n),
			V::DoubleTag(n) => S::DoubleTag(*n),
			V::StringTag(s) => S::StringTag(s.clone()),

			V::ByteArrayTag(elements) => S::ByteArrayTag(all(elements)?),
			V::IntArrayTag(elements) => S::IntArrayTag(all(elements)?),
			V::LongArrayTag(elements) => S::LongArrayTag(all(elements)?),
			V::ListTag(elements) => S::ListTag(all(elements)?),
			V::CompoundTag(fields) => S::CompoundTag(
				fields.iter().map(|(name, field)| Ok((*name, field.stage()?))).collect::<Result<_, StageError>>()?,
			),

			V::Function { name, body, tail } => S::Function { name: *name, body: bx!(body.stage()?), tail: bx!(tail.stage()?) },
			V::Run(name) => S::Run(*name),

			V::Splice(splicee) => match splicee.as_ref() {
				MetaNeutral::Hole => return Err(StageError::Hole),
				splicee => return Err(StageError::NotAQuotation { normal_form: splicee.reify(&Unifier::default()) }),
			},
			V::Unquoted(splicee) => return Err(StageError::NotAQuotation { normal_form: splicee.reify(&Unifier::default()) }),
			V::Hole => return Err(StageError::Hole),
		})
	}
}
