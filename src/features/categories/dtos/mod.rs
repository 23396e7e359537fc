mod category_dto;

pub use category_dto::{
    CategoryFormDto, CategoryNameDto, CategoryResponseDto, CategoryTranslationDto,
    CategoryTreeQuery, CategoryViewDto, CreateCategoryDto, UpdateCategoryDto,
};
