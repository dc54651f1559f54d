mod opportunity_dto;

pub use opportunity_dto::{
    CreateOpportunityDto, ListOpportunitiesQuery, OpportunityDetailDto, OpportunityResponseDto,
    OpportunitySortBy, SortDirection,
};
